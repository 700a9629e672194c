pub mod error;
pub use self::error::AuthError;

pub mod health;
pub use self::health::health;

pub mod root;
pub use self::root::root;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// common functions for the handlers
use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"success": bool, "message": string}` body shared by both endpoints.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

impl StatusMessage {
    #[must_use]
    pub fn success(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

/// Reject empty values, `message` names the offending field.
pub(crate) fn require(value: &str, message: &'static str) -> Result<(), AuthError> {
    if value.is_empty() {
        Err(AuthError::InvalidField(message))
    } else {
        Ok(())
    }
}

/// Fallback for unsupported verbs on the API routes.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
