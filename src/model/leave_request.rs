use crate::model::status::ApprovalStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum LeaveType {
    #[serde(rename = "Full Day")]
    #[strum(serialize = "Full Day")]
    FullDay,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum HalfDaySession {
    #[serde(rename = "First Half")]
    #[strum(serialize = "First Half")]
    FirstHalf,
    #[serde(rename = "Second Half")]
    #[strum(serialize = "Second Half")]
    SecondHalf,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveEntry {
    #[schema(example = "2023-11-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub leave_type: LeaveType,
    /// Present iff leave_type is Half Day.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub half_day_session: Option<HalfDaySession>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: u64,
    pub user_id: u64,
    /// At least one entry; the earliest date names the request in messages.
    pub leave_entries: Vec<LeaveEntry>,
    #[schema(example = "Family vacation.")]
    pub reason: String,
    pub status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approver_id: Option<u64>,
}

impl LeaveRequest {
    /// Earliest requested date, used when notifying the owner of a decision.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.leave_entries.iter().map(|e| e.date).min()
    }

    /// Full days count 1, half days 0.5.
    pub fn total_days(&self) -> f64 {
        self.leave_entries
            .iter()
            .map(|e| match e.leave_type {
                LeaveType::FullDay => 1.0,
                LeaveType::HalfDay => 0.5,
            })
            .sum()
    }
}
