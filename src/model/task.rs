use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    #[strum(serialize = "Done")]
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub project_id: u64,
    #[schema(example = "Setup Authentication")]
    pub title: String,
    pub description: String,
    pub assigned_to: Vec<u64>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(example = "2023-11-10", format = "date", value_type = Option<String>)]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(format = "date", value_type = Option<String>)]
    pub completion_date: Option<NaiveDate>,
}
