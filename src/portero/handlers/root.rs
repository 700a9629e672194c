use axum::response::{Html, IntoResponse};

pub const ROOT_BODY: &str =
    "<h1>Portero Backend is Running</h1><p>This is a placeholder for static file serving.</p>";

// axum handler for the placeholder index page
pub async fn root() -> impl IntoResponse {
    Html(ROOT_BODY)
}
