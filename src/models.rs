use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupReq {
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice@example.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
    #[schema(example = "Timesheet Pro Inc.")]
    pub company: String,
    /// Required when the company already has members; the first account for a
    /// new company becomes its admin and has no manager.
    pub manager_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "alice@example.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Email address.
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
