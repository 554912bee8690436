use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shared lifecycle for timesheets and leave requests.
/// Pending is the only state that can be transitioned out of or edited;
/// Approved and Rejected are terminal.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ApprovalStatus {
    #[serde(rename = "Pending")]
    #[strum(serialize = "Pending")]
    Pending,
    #[serde(rename = "Approved")]
    #[strum(serialize = "Approved")]
    Approved,
    #[serde(rename = "Rejected")]
    #[strum(serialize = "Rejected")]
    Rejected,
}

impl ApprovalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Rejected)
    }
}
