// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at the emulator.
//!
//! The emulator provides a clean state for each test run.

use hyrox_tracker::models::{
    Category, Gender, History, PerformanceRecord, Station, StationTimes, UserProfile,
};
use serde::{Deserialize, Serialize};

mod common;
use common::test_db;

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

fn test_profile() -> UserProfile {
    UserProfile {
        name: "Test Athlete".to_string(),
        email: "test@example.com".to_string(),
        category: Category::Doubles,
        target_time: 75,
        age: 40,
        gender: Gender::Male,
        created_at: "2024-01-15T10:00:00Z".to_string(),
    }
}

fn test_record(user_id: &str, date: &str, total_time: u32) -> PerformanceRecord {
    let mut stations = StationTimes::default();
    stations.set(Station::RowErg, 270);
    PerformanceRecord {
        id: None,
        user_id: user_id.to_string(),
        date: date.to_string(),
        total_time,
        stations,
        notes: None,
        created_at: Some("2024-01-15T10:00:00Z".to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_creation() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let before = db.get_profile(&user_id).await.unwrap();
    assert!(before.is_none(), "Profile should not exist before creation");

    db.create_profile(&user_id, &test_profile()).await.unwrap();

    let after = db.get_profile(&user_id).await.unwrap().unwrap();
    assert_eq!(after, test_profile());
}

/// User document written by an old client that sent a non-numeric age.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MangledProfile {
    name: String,
    category: String,
    target_time: u32,
    age: String,
    gender: String,
    created_at: String,
}

#[tokio::test]
async fn test_unreadable_profile_reads_as_missing() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    db.insert_raw_profile(
        &user_id,
        MangledProfile {
            name: "Old Client".to_string(),
            category: "Open".to_string(),
            target_time: 90,
            age: "NaN".to_string(),
            gender: "male".to_string(),
            created_at: "2023-06-01T10:00:00Z".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(db.get_profile(&user_id).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PERFORMANCE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_performance_ids_assigned_and_scoped_to_user() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let other_user = unique_user_id();

    let stored = db
        .add_performance(&test_record(&user_id, "2024-01-10", 5400))
        .await
        .unwrap();
    assert!(stored.id.is_some(), "Store should assign a document ID");

    db.add_performance(&test_record(&other_user, "2024-01-11", 5000))
        .await
        .unwrap();

    let records = db.get_performances_for_user(&user_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, stored.id);
    assert_eq!(records[0].stations.row_erg, 270);
}

#[tokio::test]
async fn test_performance_history_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    for (date, total) in [("2024-01-10", 5400), ("2024-01-05", 5600), ("2024-01-20", 5200)] {
        db.add_performance(&test_record(&user_id, date, total))
            .await
            .unwrap();
    }

    let records = db.get_performances_for_user(&user_id).await.unwrap();
    let history = History::from_records(records, Some(&test_profile()));

    let dates: Vec<&str> = history.chart.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, ["2024-01-05", "2024-01-10", "2024-01-20"]);
    assert_eq!(history.stats.personal_best, Some(5200));
    assert_eq!(history.stats.target_gap, Some(5200 - 75 * 60));
}

/// Single-station document with a negative time, as the old form could save.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NegativeStationDocument {
    user_id: String,
    station: String,
    minutes: i64,
    seconds: i64,
    total_seconds: i64,
    date: String,
}

#[tokio::test]
async fn test_unreadable_performance_is_skipped() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    db.insert_raw_performance(NegativeStationDocument {
        user_id: user_id.clone(),
        station: "1️⃣ SkiErg".to_string(),
        minutes: -5,
        seconds: 0,
        total_seconds: -300,
        date: "20/01/2024".to_string(),
    })
    .await
    .unwrap();
    let stored = db
        .add_performance(&test_record(&user_id, "2024-01-10", 5400))
        .await
        .unwrap();

    let records = db.get_performances_for_user(&user_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, stored.id);
}
