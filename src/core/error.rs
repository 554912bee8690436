use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

/// Error taxonomy for the approval/aggregation core. All variants are local
/// and non-fatal: the store is left unchanged on every error path and the
/// caller decides user-facing messaging.
#[derive(Debug, Display, Error)]
pub enum CoreError {
    /// Malformed draft; the record never enters the store.
    #[display(fmt = "{}", reason)]
    Validation { reason: String },
    /// Actor lacks visibility or approve rights over the target record.
    #[display(fmt = "{}", reason)]
    Authorization { reason: String },
    /// Transition or edit attempted on a record not in Pending.
    #[display(fmt = "{}", reason)]
    InvalidState { reason: String },
    /// Referenced id does not exist.
    #[display(fmt = "{} not found", what)]
    NotFound { what: String },
}

impl CoreError {
    pub fn validation(reason: impl Into<String>) -> Self {
        CoreError::Validation {
            reason: reason.into(),
        }
    }

    pub fn authorization(reason: impl Into<String>) -> Self {
        CoreError::Authorization {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        CoreError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound { what: what.into() }
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            CoreError::Authorization { .. } => StatusCode::FORBIDDEN,
            CoreError::InvalidState { .. } => StatusCode::CONFLICT,
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
