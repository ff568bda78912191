// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display language and the catalog of user-facing result messages.
//!
//! Only the messages the API itself returns live here; page copy belongs to
//! the frontend.

use crate::config::LANGUAGE_COOKIE;
use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown language: {0}")]
pub struct UnknownLanguage(pub String);

/// Messages returned to the user after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    FillAllFields,
    PasswordMismatch,
    AccountCreated,
    LoginSuccess,
    PerformanceSaved,
}

impl Message {
    /// Stable key clients can use to look the message up themselves.
    pub fn key(self) -> &'static str {
        match self {
            Message::FillAllFields => "fillAllFields",
            Message::PasswordMismatch => "passwordMismatch",
            Message::AccountCreated => "accountCreated",
            Message::LoginSuccess => "loginSuccess",
            Message::PerformanceSaved => "success",
        }
    }

    pub fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (Message::FillAllFields, Language::Fr) => "Veuillez remplir tous les champs",
            (Message::FillAllFields, Language::En) => "Please fill all fields",
            (Message::PasswordMismatch, Language::Fr) => "Les mots de passe ne correspondent pas",
            (Message::PasswordMismatch, Language::En) => "Passwords do not match",
            (Message::AccountCreated, Language::Fr) => "Compte créé avec succès!",
            (Message::AccountCreated, Language::En) => "Account created successfully!",
            (Message::LoginSuccess, Language::Fr) => "Connexion réussie!",
            (Message::LoginSuccess, Language::En) => "Login successful!",
            (Message::PerformanceSaved, Language::Fr) => "Succès!",
            (Message::PerformanceSaved, Language::En) => "Success!",
        }
    }
}

/// Language resolved for the current request.
///
/// Taken from the preference cookie when it holds a known language, otherwise
/// from `Config::default_language`.
#[derive(Debug, Clone, Copy)]
pub struct Locale(pub Language);

impl Locale {
    pub fn resolve(jar: &CookieJar, default: Language) -> Self {
        let language = jar
            .get(LANGUAGE_COOKIE)
            .and_then(|c| c.value().parse().ok())
            .unwrap_or(default);
        Locale(language)
    }
}

impl FromRequestParts<Arc<AppState>> for Locale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Locale::resolve(&jar, state.config.default_language))
    }
}
