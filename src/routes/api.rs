// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::config::LANGUAGE_COOKIE;
use crate::error::{AppError, Result};
use crate::i18n::{Language, Locale, Message};
use crate::middleware::auth::AuthUser;
use crate::models::{PerformanceRecord, UserProfile};
use crate::services::{Dashboard, FormBody, RawForm, SubmitResult};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How long the language preference cookie is kept.
const LANGUAGE_COOKIE_DAYS: i64 = 365;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route(
            "/api/performances",
            get(list_performances).post(create_performance),
        )
        .route("/api/performances/station", post(create_station_entry))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/preferences", get(get_preferences))
        .route("/api/preferences/language", put(set_language))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the signed-in athlete's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    Ok(Json(profile))
}

// ─── Performances ────────────────────────────────────────────

/// Response after storing a performance.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceResponse {
    #[serde(flatten)]
    pub result: SubmitResult,
    pub message: String,
    pub message_key: String,
}

impl CreatePerformanceResponse {
    fn new(result: SubmitResult, locale: Locale) -> Self {
        Self {
            result,
            message: Message::PerformanceSaved.text(locale.0).to_string(),
            message_key: Message::PerformanceSaved.key().to_string(),
        }
    }
}

/// Performances for the signed-in athlete, most recent first.
async fn list_performances(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PerformanceRecord>>> {
    let records = state.performances.list(&user.user_id).await?;
    tracing::debug!(uid = %user.user_id, count = records.len(), "Listing performances");
    Ok(Json(records))
}

/// Log a session from the multi-station form.
async fn create_performance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    locale: Locale,
    WithRejection(Json(body), _): WithRejection<Json<FormBody>, AppError>,
) -> Result<(StatusCode, Json<CreatePerformanceResponse>)> {
    let form = RawForm::from_json(body);
    let result = state.performances.submit(&form, &user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePerformanceResponse::new(result, locale)),
    ))
}

/// Log a single station.
async fn create_station_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    locale: Locale,
    WithRejection(Json(body), _): WithRejection<Json<FormBody>, AppError>,
) -> Result<(StatusCode, Json<CreatePerformanceResponse>)> {
    let form = RawForm::from_json(body);
    let today = chrono::Utc::now().date_naive();
    let result = state
        .performances
        .submit_station_entry(&form, &user.user_id, today)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePerformanceResponse::new(result, locale)),
    ))
}

// ─── Dashboard ───────────────────────────────────────────────

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Dashboard>> {
    Ok(Json(state.performances.dashboard(&user.user_id).await?))
}

// ─── Preferences ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PreferencesResponse {
    pub language: Language,
}

#[derive(Deserialize)]
pub struct SetLanguageRequest {
    pub language: String,
}

async fn get_preferences(locale: Locale) -> Json<PreferencesResponse> {
    Json(PreferencesResponse { language: locale.0 })
}

/// Store the display language in the preference cookie.
async fn set_language(
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    WithRejection(Json(request), _): WithRejection<Json<SetLanguageRequest>, AppError>,
) -> Result<(CookieJar, Json<PreferencesResponse>)> {
    let language: Language = request
        .language
        .parse()
        .map_err(|e: crate::i18n::UnknownLanguage| AppError::BadRequest(e.to_string()))?;

    tracing::debug!(uid = %user.user_id, language = language.code(), "Language preference set");

    let cookie = Cookie::build((LANGUAGE_COOKIE, language.code()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(LANGUAGE_COOKIE_DAYS));

    Ok((jar.add(cookie), Json(PreferencesResponse { language })))
}
