// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client.
//!
//! Accounts live in Firebase Authentication; this module only creates them
//! and checks credentials through the Auth REST API. Sessions are issued by
//! this service as JWTs (see `middleware::auth`), so no provider tokens are
//! kept.
//!
//! An in-memory provider with the same error behaviour backs tests and local
//! development.

use crate::config::{Config, IdentityBackend};
use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

const FIREBASE_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Provider error codes, matching what Firebase returns.
pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";
pub const INVALID_LOGIN_CREDENTIALS: &str = "INVALID_LOGIN_CREDENTIALS";

type HmacSha256 = Hmac<Sha256>;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user ID; keys the profile document and owns records
    pub uid: String,
    pub email: String,
}

#[derive(Clone)]
enum Provider {
    Firebase {
        http: reqwest::Client,
        base_url: String,
        api_key: String,
    },
    InMemory(Arc<DashMap<String, StoredAccount>>),
}

struct StoredAccount {
    uid: String,
    email: String,
    salt: [u8; 16],
    password_hash: Vec<u8>,
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityService {
    provider: Provider,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
struct FirebaseErrorBody {
    error: FirebaseError,
}

#[derive(Deserialize)]
struct FirebaseError {
    message: String,
}

impl IdentityService {
    /// Build the provider selected in `config`.
    ///
    /// For local development against the Auth emulator, set
    /// FIREBASE_AUTH_EMULATOR_HOST.
    pub fn from_config(config: &Config) -> Self {
        match config.identity_backend {
            IdentityBackend::InMemory => Self::new_in_memory(),
            IdentityBackend::Firebase => {
                let base_url = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
                    Ok(host) => {
                        tracing::info!(host = %host, "Using Firebase Auth emulator");
                        format!("http://{}/identitytoolkit.googleapis.com/v1", host)
                    }
                    Err(_) => FIREBASE_AUTH_URL.to_string(),
                };
                Self::new_firebase(base_url, config.firebase_api_key.clone())
            }
        }
    }

    pub fn new_firebase(base_url: String, api_key: String) -> Self {
        Self {
            provider: Provider::Firebase {
                http: reqwest::Client::new(),
                base_url,
                api_key,
            },
        }
    }

    pub fn new_in_memory() -> Self {
        Self {
            provider: Provider::InMemory(Arc::new(DashMap::new())),
        }
    }

    /// Number of accounts held by the in-memory provider (0 for Firebase).
    pub fn local_account_count(&self) -> usize {
        match &self.provider {
            Provider::InMemory(accounts) => accounts.len(),
            Provider::Firebase { .. } => 0,
        }
    }

    /// Create an account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let identity = match &self.provider {
            Provider::Firebase { .. } => {
                self.firebase_call("accounts:signUp", email, password)
                    .await?
            }
            Provider::InMemory(accounts) => {
                let key = email.trim().to_lowercase();
                let mut salt = [0u8; 16];
                let mut uid = [0u8; 14];
                let rng = SystemRandom::new();
                rng.fill(&mut salt)
                    .and_then(|_| rng.fill(&mut uid))
                    .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;

                let account = StoredAccount {
                    uid: hex::encode(uid),
                    email: email.trim().to_string(),
                    salt,
                    password_hash: hash_password(&salt, password)?,
                };
                let identity = Identity {
                    uid: account.uid.clone(),
                    email: account.email.clone(),
                };

                match accounts.entry(key) {
                    Entry::Occupied(_) => {
                        return Err(AppError::IdentityRejected(EMAIL_EXISTS.to_string()))
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(account);
                    }
                }
                identity
            }
        };

        tracing::info!(uid = %identity.uid, "Account created");
        Ok(identity)
    }

    /// Check credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        match &self.provider {
            Provider::Firebase { .. } => {
                self.firebase_call("accounts:signInWithPassword", email, password)
                    .await
            }
            Provider::InMemory(accounts) => {
                let rejected = || AppError::IdentityRejected(INVALID_LOGIN_CREDENTIALS.to_string());
                let account = accounts
                    .get(&email.trim().to_lowercase())
                    .ok_or_else(rejected)?;

                let candidate = hash_password(&account.salt, password)?;
                if bool::from(candidate.as_slice().ct_eq(account.password_hash.as_slice())) {
                    Ok(Identity {
                        uid: account.uid.clone(),
                        email: account.email.clone(),
                    })
                } else {
                    Err(rejected())
                }
            }
        }
    }

    /// POST an e-mail/password request to the Auth REST API.
    async fn firebase_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let Provider::Firebase {
            http,
            base_url,
            api_key,
        } = &self.provider
        else {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Firebase call on a non-Firebase provider"
            )));
        };

        let url = format!("{}/{}?key={}", base_url, method, urlencoding::encode(api_key));
        let response = http
            .post(&url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            // 400 carries the provider's reason, e.g. EMAIL_EXISTS or WEAK_PASSWORD
            if status.as_u16() == 400 {
                let reason = serde_json::from_str::<FirebaseErrorBody>(&body)
                    .map(|b| b.error.message)
                    .unwrap_or_else(|_| body.clone());
                tracing::info!(method, reason = %reason, "Identity provider rejected request");
                return Err(AppError::IdentityRejected(reason));
            }

            return Err(AppError::IdentityUnavailable(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let parsed: PasswordResponse = response
            .json()
            .await
            .map_err(|e| AppError::IdentityUnavailable(format!("JSON parse error: {}", e)))?;

        Ok(Identity {
            uid: parsed.local_id,
            email: parsed.email,
        })
    }
}

fn hash_password(salt: &[u8], password: &str) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(password.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let identity = IdentityService::new_in_memory();

        let created = identity.sign_up("Jane@Example.com", "secret123").await.unwrap();
        let signed_in = identity.sign_in("jane@example.com", "secret123").await.unwrap();

        assert_eq!(created, signed_in);
        assert_eq!(created.uid.len(), 28);
        assert_eq!(identity.local_account_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let identity = IdentityService::new_in_memory();
        identity.sign_up("jane@example.com", "secret123").await.unwrap();

        let err = identity
            .sign_up("JANE@example.com", "other-secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IdentityRejected(ref m) if m == EMAIL_EXISTS));
        assert_eq!(identity.local_account_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let identity = IdentityService::new_in_memory();
        identity.sign_up("jane@example.com", "secret123").await.unwrap();

        let err = identity
            .sign_in("jane@example.com", "secret124")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IdentityRejected(ref m) if m == INVALID_LOGIN_CREDENTIALS));

        let err = identity.sign_in("nobody@example.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::IdentityRejected(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let identity =
            IdentityService::new_firebase("http://127.0.0.1:9".to_string(), "key".to_string());

        let err = identity.sign_in("jane@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::IdentityUnavailable(_)));
    }
}
