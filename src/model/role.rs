use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Role {
    #[serde(rename = "Admin")]
    #[strum(serialize = "Admin")]
    Admin,
    #[serde(rename = "Manager")]
    #[strum(serialize = "Manager")]
    Manager,
    #[serde(rename = "Team Leader")]
    #[strum(serialize = "Team Leader")]
    TeamLeader,
    #[serde(rename = "Employee")]
    #[strum(serialize = "Employee")]
    Employee,
}

/// How far an actor can see into other users' timesheets and leave requests.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VisibilityScope {
    /// Every record owned by a user in the actor's company.
    Company,
    /// Records owned by users whose manager_id equals the actor's id (one hop).
    DirectReports,
    /// Only the actor's own records.
    SelfOnly,
}

#[derive(Debug, Copy, Clone)]
pub struct Capabilities {
    pub can_approve: bool,
    pub scope: VisibilityScope,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Manager),
            3 => Some(Role::TeamLeader),
            4 => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_id(&self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Manager => 2,
            Role::TeamLeader => 3,
            Role::Employee => 4,
        }
    }

    /// Single lookup table for role-based branching. Admin sees the whole
    /// company but is deliberately denied the approve/reject action; only
    /// managers and team leaders approve.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                can_approve: false,
                scope: VisibilityScope::Company,
            },
            Role::Manager => Capabilities {
                can_approve: true,
                scope: VisibilityScope::Company,
            },
            Role::TeamLeader => Capabilities {
                can_approve: true,
                scope: VisibilityScope::DirectReports,
            },
            Role::Employee => Capabilities {
                can_approve: false,
                scope: VisibilityScope::SelfOnly,
            },
        }
    }

    /// Roles allowed to send company-wide announcements.
    pub fn can_announce(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::TeamLeader)
    }
}
