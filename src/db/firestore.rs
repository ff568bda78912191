// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (athlete profile documents)
//! - Performances (append-only session records)
//!
//! Besides Firestore itself the wrapper can run against a process-local
//! in-memory store (tests, local development) or offline, where every call
//! fails with a database error.

use crate::db::{collections, new_document_id};
use crate::error::AppError;
use crate::models::{PerformanceRecord, StoredPerformance, UserProfile};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// In-memory documents, kept as raw JSON so they go through the same
/// decode-or-skip path as Firestore documents. Performances keep insertion
/// order.
#[derive(Default)]
struct MemoryStore {
    users: DashMap<String, serde_json::Value>,
    performances: RwLock<Vec<(String, serde_json::Value)>>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory store (tests and local development).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get the profile for an identity.
    ///
    /// A profile document that no longer decodes (hand-edited, or written
    /// with NaN numbers by an old client) is treated as missing.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        let decoded = match &self.backend {
            Backend::Firestore(client) => {
                let doc = client
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .one(user_id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                match doc {
                    Some(doc) => firestore::FirestoreDb::deserialize_doc_to::<UserProfile>(&doc)
                        .map_err(|e| e.to_string()),
                    None => return Ok(None),
                }
            }
            Backend::Memory(store) => match store.users.get(user_id) {
                Some(doc) => serde_json::from_value::<UserProfile>(doc.value().clone())
                    .map_err(|e| e.to_string()),
                None => return Ok(None),
            },
            Backend::Offline => return Err(Self::offline()),
        };

        match decoded {
            Ok(profile) => Ok(Some(profile)),
            Err(error) => {
                tracing::warn!(user_id, error = %error, "Ignoring unreadable profile");
                Ok(None)
            }
        }
    }

    /// Store the profile created at signup.
    pub async fn create_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(user_id)
                    .object(profile)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                let value =
                    serde_json::to_value(profile).map_err(|e| AppError::Database(e.to_string()))?;
                store.users.insert(user_id.to_string(), value);
            }
            Backend::Offline => return Err(Self::offline()),
        }

        tracing::debug!(user_id, "Profile stored");
        Ok(())
    }

    // ─── Performance Operations ──────────────────────────────────

    /// Append a performance record. The store assigns the document ID, which
    /// is set on the returned record.
    pub async fn add_performance(
        &self,
        record: &PerformanceRecord,
    ) -> Result<PerformanceRecord, AppError> {
        let stored = match &self.backend {
            Backend::Firestore(client) => {
                let stored: PerformanceRecord = client
                    .fluent()
                    .insert()
                    .into(collections::PERFORMANCES)
                    .generate_document_id()
                    .object(record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                stored
            }
            Backend::Memory(store) => {
                let id = new_document_id()
                    .map_err(|_| AppError::Database("Failed to generate document ID".into()))?;
                let value = serde_json::to_value(record)
                    .map_err(|e| AppError::Database(e.to_string()))?;
                store.performances.write().await.push((id.clone(), value));

                PerformanceRecord {
                    id: Some(id),
                    ..record.clone()
                }
            }
            Backend::Offline => return Err(Self::offline()),
        };

        tracing::debug!(
            user_id = %record.user_id,
            id = ?stored.id,
            "Performance stored"
        );
        Ok(stored)
    }

    /// Get every performance belonging to a user, in store order.
    ///
    /// Documents in the old single-station shape are migrated; documents that
    /// cannot be interpreted are skipped.
    pub async fn get_performances_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PerformanceRecord>, AppError> {
        let stored: Vec<StoredPerformance> = match &self.backend {
            Backend::Firestore(client) => {
                let owner = user_id.to_string();
                let docs = client
                    .fluent()
                    .select()
                    .from(collections::PERFORMANCES)
                    .filter(move |q| q.for_all([q.field("userId").eq(owner.clone())]))
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                // Decode one document at a time so a bad one cannot hide the rest
                docs.iter()
                    .filter_map(|doc| {
                        match firestore::FirestoreDb::deserialize_doc_to::<StoredPerformance>(doc) {
                            Ok(stored) => Some(stored),
                            Err(e) => {
                                tracing::warn!(
                                    doc = %doc.name,
                                    error = %e,
                                    "Skipping unreadable performance"
                                );
                                None
                            }
                        }
                    })
                    .collect()
            }
            Backend::Memory(store) => {
                let docs = store.performances.read().await;
                docs.iter()
                    .filter(|(_, doc)| doc.get("userId").and_then(|v| v.as_str()) == Some(user_id))
                    .filter_map(|(id, doc)| {
                        let mut doc = doc.clone();
                        if let Some(obj) = doc.as_object_mut() {
                            obj.insert("_firestore_id".to_string(), id.clone().into());
                        }
                        match serde_json::from_value(doc) {
                            Ok(stored) => Some(stored),
                            Err(e) => {
                                tracing::warn!(id = %id, error = %e, "Skipping unreadable performance");
                                None
                            }
                        }
                    })
                    .collect()
            }
            Backend::Offline => return Err(Self::offline()),
        };

        Ok(stored
            .into_iter()
            .filter_map(StoredPerformance::into_record)
            .collect())
    }

    /// Insert a document into the performances collection as-is.
    ///
    /// Lets tests seed documents in shapes the API no longer writes.
    pub async fn insert_raw_performance<T>(&self, doc: T) -> Result<String, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let id = new_document_id()
            .map_err(|_| AppError::Database("Failed to generate document ID".into()))?;

        match &self.backend {
            Backend::Firestore(client) => {
                let _: T = client
                    .fluent()
                    .insert()
                    .into(collections::PERFORMANCES)
                    .document_id(&id)
                    .object(&doc)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                let value = serde_json::to_value(&doc).map_err(|e| AppError::Database(e.to_string()))?;
                store.performances.write().await.push((id.clone(), value));
            }
            Backend::Offline => return Err(Self::offline()),
        }

        Ok(id)
    }

    /// Write a user document as-is, bypassing `UserProfile`.
    pub async fn insert_raw_profile<T>(&self, user_id: &str, doc: T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: T = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(user_id)
                    .object(&doc)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                let value = serde_json::to_value(&doc).map_err(|e| AppError::Database(e.to_string()))?;
                store.users.insert(user_id.to_string(), value);
            }
            Backend::Offline => return Err(Self::offline()),
        }
        Ok(())
    }
}
