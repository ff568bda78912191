// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session routes.

use crate::config::{Config, SESSION_COOKIE};
use crate::error::{AppError, Result};
use crate::i18n::{Locale, Message};
use crate::middleware::auth::{create_jwt, current_session, AuthUser, SESSION_TTL_SECS};
use crate::models::UserProfile;
use crate::services::{FormBody, Identity, LoginRequest, RawForm, SessionState, SignupRequest};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use futures_util::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_VIEW_NAME_LEN: usize = 64;

/// Public account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

/// Session routes that need a signed-in user.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/session/events", get(session_events))
}

/// Response after a successful signup or login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub uid: String,
    pub email: String,
    pub message: String,
    pub message_key: String,
}

impl AuthResponse {
    fn new(identity: Identity, message: Message, locale: Locale) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
            message: message.text(locale.0).to_string(),
            message_key: message.key().to_string(),
        }
    }
}

/// Cookies are only marked Secure when the frontend is served over HTTPS.
fn secure_cookies(config: &Config) -> bool {
    !(config.frontend_url.starts_with("http://localhost")
        || config.frontend_url.starts_with("http://127.0.0.1"))
}

fn session_cookie(config: &Config, jwt: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, jwt))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure_cookies(config))
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

fn start_session(state: &AppState, jar: CookieJar, identity: &Identity) -> Result<CookieJar> {
    let jwt = create_jwt(&identity.uid, &identity.email, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    state.sessions.publish(
        &identity.uid,
        SessionState::SignedIn {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
        },
    );

    Ok(jar.add(session_cookie(&state.config, jwt)))
}

/// Create an account and its profile, then sign in.
async fn signup(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<FormBody>, AppError>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    // Nothing reaches the identity provider unless the form is valid
    let account = SignupRequest::from_form(&RawForm::from_json(body)).into_account()?;

    let identity = state.identity.sign_up(&account.email, &account.password).await?;

    let profile = UserProfile {
        name: account.name,
        email: identity.email.clone(),
        category: account.category,
        target_time: account.target_time,
        age: account.age,
        gender: account.gender,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    if let Err(e) = state.db.create_profile(&identity.uid, &profile).await {
        // The account exists now; the dashboard copes with a missing profile.
        tracing::error!(uid = %identity.uid, error = %e, "Account created but profile write failed");
        return Err(e);
    }

    tracing::info!(uid = %identity.uid, category = %profile.category, "Signup complete");

    let jar = start_session(&state, jar, &identity)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse::new(identity, Message::AccountCreated, locale)),
    ))
}

/// Sign in with e-mail and password.
async fn login(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<FormBody>, AppError>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let request = LoginRequest::from_form(&RawForm::from_json(body));
    request.check()?;

    let identity = state
        .identity
        .sign_in(request.email.trim(), &request.password)
        .await?;
    tracing::info!(uid = %identity.uid, "Login successful");

    let jar = start_session(&state, jar, &identity)?;
    Ok((
        jar,
        Json(AuthResponse::new(identity, Message::LoginSuccess, locale)),
    ))
}

/// Clear the session cookie and tell the user's open views.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    if let Some(user) = current_session(&jar, &headers, &state.config.jwt_signing_key) {
        state
            .sessions
            .publish(&user.user_id, SessionState::SignedOut);
        tracing::info!(uid = %user.user_id, "Logged out");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

/// Current session, or `signed_out`. Never fails.
async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Json<SessionState> {
    let state = match current_session(&jar, &headers, &state.config.jwt_signing_key) {
        Some(user) => SessionState::SignedIn {
            uid: user.user_id,
            email: user.email,
        },
        None => SessionState::SignedOut,
    };
    Json(state)
}

#[derive(Deserialize)]
pub struct SessionEventsParams {
    #[serde(default)]
    view: Option<String>,
}

/// Stream session changes to one view.
///
/// The first event is the current state. Opening the stream again for the
/// same view ends the previous one.
async fn session_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SessionEventsParams>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let view = params
        .view
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "default".to_string());
    if view.len() > MAX_VIEW_NAME_LEN {
        return Err(AppError::BadRequest("View name too long".to_string()));
    }

    let subscription = state.sessions.subscribe(&user.user_id, &view);
    tracing::debug!(uid = %user.user_id, view = %view, "Session stream opened");

    let current = SessionState::SignedIn {
        uid: user.user_id,
        email: user.email,
    };

    // Dropping the stream (client gone) drops the subscription with it
    let updates = stream::unfold(subscription, |mut subscription| async move {
        let next = subscription.recv().await?;
        Some((next, subscription))
    });

    let events = stream::once(async move { current })
        .chain(updates)
        .map(|state| Event::default().event("session").json_data(state));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
