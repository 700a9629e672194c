use super::error::AuthError;
use crate::portero::{
    password::{self, PasswordError},
    store::{StoreError, UserStore},
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument};
use utoipa::ToSchema;

// verified against when the email is unknown so both failure paths cost the same
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| password::hash("portero-unknown-user").ok());

#[derive(ToSchema, Deserialize)]
pub struct UserLogin {
    email: String,
    password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Public profile returned on a successful login.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub success: bool,
    pub user: PublicUser,
}

#[utoipa::path(
    post,
    path= "/api/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = LoginSuccess, content_type = "application/json"),
        (status = 400, description = "Invalid payload", body = super::StatusMessage),
        (status = 401, description = "Invalid email or password", body = super::StatusMessage),
        (status = 405, description = "Method Not Allowed"),
        (status = 500, description = "Database error", body = super::StatusMessage),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    store: Extension<Arc<dyn UserStore>>,
    payload: Result<Json<UserLogin>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(credentials) = payload.map_err(|rejection| {
        debug!("Rejected login payload: {}", rejection.body_text());

        AuthError::InvalidPayload(rejection.body_text())
    })?;

    debug!("user: {:?}", credentials);

    let record = store
        .find_by_email(&credentials.email)
        .await
        .map_err(AuthError::StoreRead)?;

    let stored_hash = record.as_ref().map(|record| record.password_hash.clone());
    let password = credentials.password;

    // Argon2 is CPU bound, keep it off the reactor
    let verified = tokio::task::spawn_blocking(move || {
        match stored_hash.or_else(|| DUMMY_HASH.clone()) {
            Some(hash) => password::verify(&password, &hash),
            None => Ok(false),
        }
    })
    .await
    .map_err(|err| AuthError::Hashing(err.to_string()))?;

    match (record, verified) {
        (Some(record), Ok(true)) => {
            debug!("Login successful");

            let body = LoginSuccess {
                success: true,
                user: PublicUser {
                    name: record.name,
                    email: record.email,
                    role: record.role,
                },
            };

            Ok((StatusCode::OK, Json(body)))
        }

        (None, _) => {
            debug!("User not found");

            Err(AuthError::InvalidCredentials)
        }

        (Some(_), Ok(false)) => {
            debug!("Password mismatch");

            Err(AuthError::InvalidCredentials)
        }

        (Some(_), Err(err @ PasswordError::InvalidHash(_))) => Err(AuthError::StoreRead(
            StoreError::InvalidRecord(err.to_string()),
        )),

        (Some(_), Err(err)) => Err(AuthError::from(err)),
    }
}
