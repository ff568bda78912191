// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Language preference tests.

use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, create_test_jwt, get_request, json_request};

#[tokio::test]
async fn test_default_language_from_config() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(get_request("/api/preferences", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["language"], "fr");
}

#[tokio::test]
async fn test_language_cookie_overrides_default() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let mut request = get_request("/api/preferences", Some(&token));
    request
        .headers_mut()
        .insert(header::COOKIE, "hyrox-language=en".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["language"], "en");
}

#[tokio::test]
async fn test_set_language_persists_cookie() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/preferences/language",
            Some(&token),
            json!({ "language": "EN" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("hyrox-language=en"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("HttpOnly"));

    assert_eq!(body_json(response).await["language"], "en");
}

#[tokio::test]
async fn test_unknown_language_rejected() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/preferences/language",
            Some(&token),
            json!({ "language": "de" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_language_body_without_language() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/preferences/language",
            Some(&token),
            json!({ "lang": "en" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"], "bad_request");
}
