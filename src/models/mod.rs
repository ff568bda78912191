// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod history;
pub mod performance;
pub mod profile;

pub use history::{newest_first, ChartPoint, History, HistoryStats};
pub use performance::{PerformanceRecord, Station, StationEntry, StationTimes, StoredPerformance};
pub use profile::{Category, Gender, UserProfile};
