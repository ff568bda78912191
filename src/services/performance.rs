// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Performance submission and history service.
//!
//! Handles the two entry forms:
//! 1. Normalize the raw form into a canonical record
//! 2. Stamp the creation time
//! 3. Append to the store
//!
//! and builds the dashboard from a user's stored records.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{newest_first, History, PerformanceRecord, UserProfile};
use crate::services::normalize::{normalize_performance, normalize_station_entry, RawForm};
use crate::time_utils::format_utc_rfc3339;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Warning attached when station times add up to more than the total.
pub const STATIONS_EXCEED_TOTAL: &str = "stationsExceedTotal";

/// Result of storing one submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub record: PerformanceRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<&'static str>,
}

/// Dashboard payload. `profile` is `None` until one exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub profile: Option<UserProfile>,
    #[serde(flatten)]
    pub history: History,
}

#[derive(Clone)]
pub struct PerformanceService {
    db: FirestoreDb,
}

impl PerformanceService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Store a multi-station submission for `user_id`.
    ///
    /// Nothing is written when normalization fails.
    pub async fn submit(&self, form: &RawForm, user_id: &str) -> Result<SubmitResult> {
        let record = normalize_performance(form, user_id)?;
        self.store(record).await
    }

    /// Store a single-station submission, converted to a canonical record.
    pub async fn submit_station_entry(
        &self,
        form: &RawForm,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<SubmitResult> {
        let entry = normalize_station_entry(form, today)?;
        tracing::debug!(
            user_id,
            station = %entry.station,
            total_seconds = entry.total_seconds,
            "Station entry normalized"
        );
        self.store(entry.into_record(user_id)).await
    }

    async fn store(&self, mut record: PerformanceRecord) -> Result<SubmitResult> {
        record.created_at = Some(format_utc_rfc3339(Utc::now()));

        let mut warnings = Vec::new();
        if record.stations_exceed_total() {
            tracing::warn!(
                user_id = %record.user_id,
                total_time = record.total_time,
                station_sum = record.stations.sum(),
                "Station times exceed total time"
            );
            warnings.push(STATIONS_EXCEED_TOTAL);
        }

        let record = self.db.add_performance(&record).await?;
        tracing::info!(
            user_id = %record.user_id,
            id = ?record.id,
            date = %record.date,
            "Performance saved"
        );

        Ok(SubmitResult { record, warnings })
    }

    /// All of a user's records, most recent first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<PerformanceRecord>> {
        let records = self.db.get_performances_for_user(user_id).await?;
        Ok(newest_first(records))
    }

    /// Profile and history aggregation for the dashboard.
    pub async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        let profile = self.db.get_profile(user_id).await?;
        if profile.is_none() {
            tracing::debug!(user_id, "No profile yet, rendering dashboard without it");
        }

        let records = self.db.get_performances_for_user(user_id).await?;
        let history = History::from_records(records, profile.as_ref());

        Ok(Dashboard { profile, history })
    }
}
