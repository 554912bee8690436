use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice@example.com", format = "email", value_type = String)]
    pub email: String,
    /// Argon2 hash, never the plaintext. API responses use UserResponse,
    /// which leaves this field out.
    pub password: String,
    pub role: Role,
    /// Reporting line: the id of this user's manager or team leader.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manager_id: Option<u64>,
    /// Tenant key; all visibility and aggregation is scoped to one company.
    #[schema(example = "Timesheet Pro Inc.")]
    pub company: String,
}

impl User {
    pub fn same_company(&self, other: &User) -> bool {
        self.company.eq_ignore_ascii_case(&other.company)
    }
}
