use super::{error::AuthError, require, StatusMessage};
use crate::{
    cli::globals::GlobalArgs,
    portero::{
        password,
        store::{NewUser, StoreError, UserStore},
    },
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

pub const ADMIN_ROLE: &str = "Admin";
pub const MSG_REGISTERED: &str = "Registration successful! Please login.";

#[derive(ToSchema, Deserialize)]
pub struct UserRegister {
    name: String,
    email: String,
    password: String,
    role: String,
    #[serde(rename = "adminKey", default)]
    admin_key: Option<String>,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl UserRegister {
    fn validate(&self) -> Result<(), AuthError> {
        require(&self.name, "Name is required.")?;
        require(&self.email, "Email is required.")?;
        require(&self.password, "Password is required.")?;
        require(&self.role, "Role is required.")
    }
}

/// Checks `role` and `adminKey` on the raw document, before the typed decode,
/// so an `Admin` request without the right key is refused whatever the other
/// fields hold.
fn admin_gate(document: &Value, globals: &GlobalArgs) -> Result<(), AuthError> {
    if document.get("role").and_then(Value::as_str) != Some(ADMIN_ROLE) {
        return Ok(());
    }

    let admin_key = document.get("adminKey").and_then(Value::as_str);

    if globals.admin_key_matches(admin_key) {
        Ok(())
    } else {
        warn!("Admin registration without a valid admin key");

        Err(AuthError::Authorization)
    }
}

#[utoipa::path(
    post,
    path= "/api/register",
    request_body = UserRegister,
    responses (
        (status = 200, description = "Registration successful", body = StatusMessage, content_type = "application/json"),
        (status = 400, description = "Invalid payload or email already in use", body = StatusMessage),
        (status = 403, description = "Admin role requested without a valid admin key", body = StatusMessage),
        (status = 405, description = "Method Not Allowed"),
        (status = 500, description = "Database error", body = StatusMessage),
    ),
    tag= "register"
)]
// axum handler for registration
#[instrument(skip_all)]
pub async fn register(
    store: Extension<Arc<dyn UserStore>>,
    globals: Extension<GlobalArgs>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(document) = payload.map_err(|rejection| {
        debug!("Rejected register payload: {}", rejection.body_text());

        AuthError::InvalidPayload(rejection.body_text())
    })?;

    admin_gate(&document, &globals)?;

    let user: UserRegister = serde_json::from_value(document).map_err(|err| {
        debug!("Rejected register payload: {}", err);

        AuthError::InvalidPayload(err.to_string())
    })?;

    debug!("user: {:?}", user);

    user.validate()?;

    let UserRegister {
        name,
        email,
        password,
        role,
        ..
    } = user;

    // Argon2 is CPU bound, keep it off the reactor
    let password_hash = tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))??;

    let new_user = NewUser {
        name,
        email,
        password_hash,
        role,
    };

    store.insert(&new_user).await.map_err(|err| {
        if matches!(err, StoreError::Duplicate) {
            debug!("Email already registered: {}", new_user.email);
        }

        AuthError::from(err)
    })?;

    info!("New user registered: {}", new_user.email);

    Ok((StatusCode::OK, Json(StatusMessage::success(MSG_REGISTERED))))
}
