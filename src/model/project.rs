use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ProjectStatus {
    #[serde(rename = "Not Started")]
    #[strum(serialize = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    OnHold,
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    #[schema(example = "Project Phoenix")]
    pub name: String,
    pub description: String,
    /// Owning manager.
    pub manager_id: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub team_leader_id: Option<u64>,
    /// Member roster.
    pub team_ids: Vec<u64>,
    #[schema(example = "Innovate Corp")]
    pub customer_name: String,
    #[schema(example = "Phoenix Web App")]
    pub job_name: String,
    pub estimated_hours: f64,
    /// Derived: the sum of approved timesheet hours booked to this project.
    /// Recomputed after every timesheet mutation, never hand-edited.
    pub actual_hours: f64,
    pub company: String,
    pub status: ProjectStatus,
}
