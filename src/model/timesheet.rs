use crate::model::status::ApprovalStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    #[schema(example = "Created new user authentication flow")]
    pub description: String,
    #[schema(example = 5.0)]
    pub hours: f64,
}

/// Work booked to one project within a timesheet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWork {
    pub project_id: u64,
    pub work_entries: Vec<WorkEntry>,
}

/// One day's work for one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2023-10-26", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00")]
    pub in_time: String,
    #[schema(example = "17:00")]
    pub out_time: String,
    pub project_work: Vec<ProjectWork>,
    pub status: ApprovalStatus,
    /// Set exactly once, by the review transition out of Pending.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approver_id: Option<u64>,
}

impl Timesheet {
    /// Total hours across all projects and entries.
    pub fn total_hours(&self) -> f64 {
        self.project_work
            .iter()
            .flat_map(|pw| pw.work_entries.iter())
            .map(|we| we.hours)
            .sum()
    }

    /// Hours this timesheet books to a single project.
    pub fn hours_for_project(&self, project_id: u64) -> f64 {
        self.project_work
            .iter()
            .filter(|pw| pw.project_id == project_id)
            .flat_map(|pw| pw.work_entries.iter())
            .map(|we| we.hours)
            .sum()
    }
}
