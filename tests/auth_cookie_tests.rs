// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie attribute tests.
//!
//! These tests verify the session cookie set on signup/login and its removal
//! on logout, for localhost and production-style frontends.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use tower::ServiceExt;

mod common;
use common::{create_test_app, create_test_app_with_frontend_url, json_request, signup_body};

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

#[tokio::test]
async fn test_signup_sets_session_cookie_localhost() {
    let (app, _) = create_test_app_with_frontend_url("http://localhost:5173");

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            signup_body("jane@example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookies = set_cookie_headers(&response);
    let token_cookie = find_cookie(&set_cookies, "hyrox_token");
    assert!(token_cookie.contains("Path=/"));
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("SameSite=Lax"));
    assert!(token_cookie.contains("Max-Age=2592000"));
    assert!(!token_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_cookie_secure_in_production() {
    let (app, _) = create_test_app_with_frontend_url("https://hyrox.example.com");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            signup_body("jane@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "email": "jane@example.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token_cookie = find_cookie(&set_cookie_headers(&response), "hyrox_token");
    assert!(token_cookie.contains("Secure"));
    assert!(token_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_logout_removes_session_cookie() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, "hyrox_token=test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let token_cookie = find_cookie(&set_cookie_headers(&response), "hyrox_token");
    assert!(token_cookie.contains("Path=/"));
    assert!(token_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
