// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything here is read once at startup and then passed around inside
//! `AppState`; handlers never go back to the environment.

use crate::i18n::Language;
use std::env;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "hyrox_token";

/// Name of the cookie persisting the display language.
pub const LANGUAGE_COOKIE: &str = "hyrox-language";

/// Which identity provider implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityBackend {
    /// Firebase Authentication REST API (or its emulator).
    Firebase,
    /// Process-local accounts, for local development and tests.
    InMemory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP / Firebase project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Firebase Web API key used by the Auth REST endpoints
    pub firebase_api_key: String,
    /// Identity provider implementation
    pub identity_backend: IdentityBackend,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Language used when the client has not stored a preference
    pub default_language: Language,
}

impl Config {
    /// Config for tests: in-memory identity, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            firebase_api_key: "test_api_key".to_string(),
            identity_backend: IdentityBackend::InMemory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            default_language: Language::Fr,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let identity_backend = match env::var("IDENTITY_BACKEND") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => IdentityBackend::InMemory,
            Ok(v) if v.eq_ignore_ascii_case("firebase") => IdentityBackend::Firebase,
            Ok(_) => return Err(ConfigError::Invalid("IDENTITY_BACKEND")),
            Err(_) => IdentityBackend::Firebase,
        };

        let default_language = match env::var("DEFAULT_LANGUAGE") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("DEFAULT_LANGUAGE"))?,
            Err(_) => Language::default(),
        };

        // The API key is only needed when talking to Firebase.
        let firebase_api_key = match (env::var("FIREBASE_API_KEY"), identity_backend) {
            (Ok(key), _) => key.trim().to_string(),
            (Err(_), IdentityBackend::InMemory) => String::new(),
            (Err(_), IdentityBackend::Firebase) => {
                return Err(ConfigError::Missing("FIREBASE_API_KEY"))
            }
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            firebase_api_key,
            identity_backend,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            default_language,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
