//! End-to-end tests for the registration and login endpoints.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! the in-memory user store, so no database is needed.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use portero::{
    cli::globals::GlobalArgs,
    portero::{
        router,
        store::{memory::MemoryUserStore, UserStore},
    },
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_SECRET: &str = "MRS_ADMIN_2026";

struct TestApp {
    store: Arc<MemoryUserStore>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let dyn_store: Arc<dyn UserStore> = store.clone();
        let globals = GlobalArgs::new(SecretString::from(ADMIN_SECRET.to_string()));

        Self {
            store,
            router: router(dyn_store, globals),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> Result<(StatusCode, String)> {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)?,
            )
            .await?;

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;

        Ok((status, String::from_utf8(bytes.to_vec())?))
    }

    async fn post_json(&self, uri: &str, payload: &Value) -> Result<(StatusCode, Value)> {
        let (status, body) = self
            .send(Method::POST, uri, Body::from(payload.to_string()))
            .await?;

        Ok((status, serde_json::from_str(&body)?))
    }

    async fn register(&self, payload: &Value) -> Result<(StatusCode, Value)> {
        self.post_json("/api/register", payload).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post_json("/api/login", &json!({"email": email, "password": password}))
            .await
    }
}

fn alice() -> Value {
    json!({"name": "Alice", "email": "a@x.com", "password": "p1", "role": "Student"})
}

#[tokio::test]
async fn register_login_scenario() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.register(&alice()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["message"],
        json!("Registration successful! Please login.")
    );

    let (status, body) = app.register(&alice()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Registration failed. Email may already be in use.")
    );

    let (status, body) = app.login("a@x.com", "p1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "user": {"name": "Alice", "email": "a@x.com", "role": "Student"}
        })
    );

    assert_eq!(app.store.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn round_trip_preserves_name_and_role() -> Result<()> {
    let app = TestApp::new();

    let payload = json!({
        "name": "Bob Teacher",
        "email": "bob@school.org",
        "password": "correct horse battery staple",
        "role": "Teacher"
    });
    let (status, _) = app.register(&payload).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .login("bob@school.org", "correct horse battery staple")
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], json!("Bob Teacher"));
    assert_eq!(body["user"]["email"], json!("bob@school.org"));
    assert_eq!(body["user"]["role"], json!("Teacher"));

    Ok(())
}

#[tokio::test]
async fn password_is_stored_hashed() -> Result<()> {
    let app = TestApp::new();

    let (status, _) = app.register(&alice()).await?;
    assert_eq!(status, StatusCode::OK);

    let record = app.store.find_by_email("a@x.com").await?;
    assert!(record.is_some());
    if let Some(record) = record {
        assert_ne!(record.password_hash, "p1");
        assert!(record.password_hash.starts_with("$argon2id$"));
    }

    Ok(())
}

#[tokio::test]
async fn admin_without_valid_key_is_forbidden() -> Result<()> {
    let app = TestApp::new();

    let cases = [
        json!({"name": "Eve", "email": "eve@x.com", "password": "p", "role": "Admin"}),
        json!({"name": "Eve", "email": "eve@x.com", "password": "p", "role": "Admin", "adminKey": "guess"}),
        json!({"name": "Eve", "email": "eve@x.com", "password": "p", "role": "Admin", "adminKey": ""}),
        // other fields invalid, still 403
        json!({"name": "", "email": "", "password": "", "role": "Admin", "adminKey": "guess"}),
        // missing or mistyped fields, still 403
        json!({"email": "e@x.com", "password": "p", "role": "Admin"}),
        json!({"name": 5, "email": "e@x.com", "password": "p", "role": "Admin", "adminKey": "nope"}),
        json!({"role": "Admin", "adminKey": 2026}),
    ];

    for payload in &cases {
        let (status, body) = app.register(payload).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "payload: {payload}");
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Invalid Admin Secret Key."));
    }

    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn admin_with_valid_key_registers() -> Result<()> {
    let app = TestApp::new();

    let payload = json!({
        "name": "Root",
        "email": "root@x.com",
        "password": "p",
        "role": "Admin",
        "adminKey": ADMIN_SECRET
    });
    let (status, body) = app.register(&payload).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = app.login("root@x.com", "p").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], json!("Admin"));

    Ok(())
}

#[tokio::test]
async fn role_gate_is_case_sensitive() -> Result<()> {
    let app = TestApp::new();

    // only the exact "Admin" role is privileged
    let payload = json!({"name": "Al", "email": "al@x.com", "password": "p", "role": "admin"});
    let (status, _) = app.register(&payload).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.register(&alice()).await?;
    assert_eq!(status, StatusCode::OK);

    let (unknown_status, unknown_body) = app.login("nobody@x.com", "p1").await?;
    let (wrong_status, wrong_body) = app.login("a@x.com", "wrong").await?;
    let (case_status, case_body) = app.login("A@X.COM", "p1").await?;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(case_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body, case_body);
    assert_eq!(
        unknown_body,
        json!({"success": false, "message": "Invalid email or password"})
    );

    Ok(())
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() -> Result<()> {
    let app = TestApp::new();

    for uri in ["/api/register", "/api/login"] {
        let (status, body) = app
            .send(Method::POST, uri, Body::from("name:Alice,email:a@x.com"))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        let body: Value = serde_json::from_str(&body)?;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Invalid request payload."));
    }

    let (status, _) = app
        .register(&json!({"name": "Alice", "email": "a@x.com", "password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post_json("/api/login", &json!({"email": "a@x.com"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn invalid_fields_are_rejected_before_store() -> Result<()> {
    let app = TestApp::new();

    let cases = [
        (
            json!({"name": "", "email": "a@x.com", "password": "p1", "role": "Student"}),
            "Name is required.",
        ),
        (
            json!({"name": "Alice", "email": "", "password": "p1", "role": "Student"}),
            "Email is required.",
        ),
        (
            json!({"name": "Alice", "email": "a@x.com", "password": "", "role": "Student"}),
            "Password is required.",
        ),
        (
            json!({"name": "Alice", "email": "a@x.com", "password": "p1", "role": ""}),
            "Role is required.",
        ),
    ];

    for (payload, message) in &cases {
        let (status, body) = app.register(payload).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!(message));
    }

    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn values_are_stored_as_submitted() -> Result<()> {
    let app = TestApp::new();

    let payload = json!({"name": " Al ", "email": "alice", "password": " ", "role": "Student"});
    let (status, body) = app.register(&payload).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = app.login("alice", " ").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], json!(" Al "));
    assert_eq!(body["user"]["email"], json!("alice"));

    Ok(())
}

#[tokio::test]
async fn store_outage_is_a_server_error() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.register(&alice()).await?;
    assert_eq!(status, StatusCode::OK);

    app.store.set_available(false);

    let (status, body) = app.login("a@x.com", "p1").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": "Database error during login."})
    );

    let payload = json!({"name": "Bob", "email": "b@x.com", "password": "p", "role": "Student"});
    let (status, body) = app.register(&payload).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Registration failed due to a database error.")
    );

    Ok(())
}

#[tokio::test]
async fn other_methods_are_not_allowed() -> Result<()> {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::GET, "/api/register"),
        (Method::PUT, "/api/register"),
        (Method::GET, "/api/login"),
        (Method::DELETE, "/api/login"),
        (Method::POST, "/"),
    ] {
        let (status, body) = app.send(method.clone(), uri, Body::empty()).await?;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body, "Method Not Allowed");
    }

    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn root_serves_placeholder() -> Result<()> {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert!(content_type.is_some_and(|value| value.starts_with("text/html")));

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert!(String::from_utf8(bytes.to_vec())?.contains("Backend is Running"));

    Ok(())
}

#[tokio::test]
async fn unknown_paths_serve_placeholder() -> Result<()> {
    let app = TestApp::new();

    for uri in ["/index.html", "/api", "/static/app.js"] {
        let (status, body) = app.send(Method::GET, uri, Body::empty()).await?;
        assert_eq!(status, StatusCode::OK, "uri: {uri}");
        assert!(body.contains("Backend is Running"), "uri: {uri}");
    }

    Ok(())
}

#[tokio::test]
async fn responses_are_json_and_carry_request_id() -> Result<()> {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/register")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(alice().to_string()))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/login")
                .header(CONTENT_TYPE, "application/json")
                .header("x-request-id", "req-123")
                .body(Body::from(
                    json!({"email": "a@x.com", "password": "p1"}).to_string(),
                ))?,
        )
        .await?;

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("req-123")
    );

    Ok(())
}

#[tokio::test]
async fn health_reports_store_state() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", Body::empty()).await?;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body)?;
    assert_eq!(body["database"], json!("ok"));
    assert_eq!(body["name"], json!("portero"));

    app.store.set_available(false);

    let (status, body) = app.send(Method::GET, "/health", Body::empty()).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body)?;
    assert_eq!(body["database"], json!("error"));

    Ok(())
}

#[tokio::test]
async fn concurrent_duplicate_registrations_create_one_user() -> Result<()> {
    let app = Arc::new(TestApp::new());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        tasks.push(tokio::spawn(async move { app.register(&alice()).await }));
    }

    let mut created = 0;
    for task in tasks {
        let (status, _) = task.await??;
        if status == StatusCode::OK {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    assert_eq!(created, 1);
    assert_eq!(app.store.len().await, 1);

    Ok(())
}
