use super::StatusMessage;
use crate::portero::{password::PasswordError, store::StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub const MSG_INVALID_PAYLOAD: &str = "Invalid request payload.";
pub const MSG_INVALID_ADMIN_KEY: &str = "Invalid Admin Secret Key.";
pub const MSG_EMAIL_IN_USE: &str = "Registration failed. Email may already be in use.";
pub const MSG_REGISTER_DB_ERROR: &str = "Registration failed due to a database error.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_LOGIN_DB_ERROR: &str = "Database error during login.";
pub const MSG_INTERNAL: &str = "Internal server error.";

/// Failures of the register and login handlers.
///
/// The `Display` text is for logs; clients only ever see the fixed message of
/// [`AuthError::public_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("admin role requested without a valid admin key")]
    Authorization,

    #[error("email already in use")]
    EmailInUse,

    #[error("failed to insert user: {0}")]
    StoreWrite(StoreError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("failed to read user: {0}")]
    StoreRead(StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::InvalidField(_) | Self::EmailInUse => {
                StatusCode::BAD_REQUEST
            }
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::StoreWrite(_) | Self::StoreRead(_) | Self::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => MSG_INVALID_PAYLOAD,
            Self::InvalidField(message) => *message,
            Self::Authorization => MSG_INVALID_ADMIN_KEY,
            Self::EmailInUse => MSG_EMAIL_IN_USE,
            Self::StoreWrite(_) => MSG_REGISTER_DB_ERROR,
            Self::InvalidCredentials => MSG_INVALID_CREDENTIALS,
            Self::StoreRead(_) => MSG_LOGIN_DB_ERROR,
            Self::Hashing(_) => MSG_INTERNAL,
        }
    }
}

/// Insert failures: only a unique violation is the caller's fault.
impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::EmailInUse,
            other => Self::StoreWrite(other),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl IntoResponse for AuthError {
    /// Server-side failures are logged here; the client gets the generic message.
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{}", self);
        }

        (status, Json(StatusMessage::failure(self.public_message()))).into_response()
    }
}
