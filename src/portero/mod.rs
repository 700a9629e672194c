#![allow(clippy::needless_for_each)]

use crate::{
    cli::globals::GlobalArgs,
    portero::{
        handlers::{
            health, health::__path_health, method_not_allowed, user_login,
            user_login::__path_login, user_register, user_register::__path_register,
        },
        store::{
            postgres::{PgUserStore, PoolConfig},
            UserStore,
        },
    },
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;
pub mod password;
pub mod store;

const REQUEST_ID: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login),
    components(schemas(
        health::Health,
        handlers::StatusMessage,
        user_register::UserRegister,
        user_login::UserLogin,
        user_login::LoginSuccess,
        user_login::PublicUser
    )),
    tags(
        (name = "portero", description = "Registration and login API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around a user store.
///
/// Used by the server and by tests, which pass an in-memory store.
pub fn router(store: Arc<dyn UserStore>, globals: GlobalArgs) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::root).fallback(method_not_allowed))
        .route(
            "/api/register",
            post(handlers::register).fallback(method_not_allowed),
        )
        .route(
            "/api/login",
            post(handlers::login).fallback(method_not_allowed),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .fallback(handlers::root)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(globals))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if the database is unreachable or the listener cannot be bound
pub async fn new(port: u16, dsn: &str, pool: &PoolConfig, globals: GlobalArgs) -> Result<()> {
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::connect(dsn, pool).await?);

    info!("Database connection successful");

    let app = router(store, globals);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_auth_paths() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/api/register"));
        assert!(doc.paths.paths.contains_key("/api/login"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
