use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A per-recipient notification record. Created by the event dispatcher;
/// read/dismissed only by its recipient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "Timesheet Approved")]
    pub title: String,
    pub message: String,
    pub read: bool,
    pub dismissed: bool,
    #[schema(example = "2023-10-26T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    /// View key the client should navigate to, e.g. "TIMESHEETS".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub link_to: Option<String>,
    #[serde(default)]
    pub is_announcement: bool,
}
