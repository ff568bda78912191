// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use hyrox_tracker::config::Config;
use hyrox_tracker::db::FirestoreDb;
use hyrox_tracker::routes::create_router;
use hyrox_tracker::services::IdentityService;
use hyrox_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

fn build_app(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db, IdentityService::new_in_memory()));
    (create_router(state.clone()), state)
}

/// Create a test app backed by in-memory storage and identity.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default(), FirestoreDb::new_in_memory())
}

/// Same as `create_test_app`, with a different frontend URL.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    build_app(config, FirestoreDb::new_in_memory())
}

/// Create a test app whose database is offline.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default(), FirestoreDb::new_mock())
}

/// Create a session JWT the way the login flow does.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    hyrox_tracker::middleware::auth::create_jwt(user_id, "test@example.com", signing_key)
        .expect("Failed to create JWT")
}

/// Build a JSON request, optionally authenticated with a Bearer token.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a request whose body is sent exactly as given, JSON or not.
#[allow(dead_code)]
pub fn raw_json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a GET request, optionally authenticated with a Bearer token.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A complete, valid signup form.
#[allow(dead_code)]
pub fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": "secret123",
        "confirmPassword": "secret123",
        "name": "Jane Runner",
        "category": "open",
        "targetTime": 90,
        "age": 31,
        "gender": "female"
    })
}
