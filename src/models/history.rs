// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard aggregates computed from a user's performance records.
//!
//! Unlike stored aggregates these are rebuilt on every dashboard read: a user
//! logs a handful of sessions a week, so the record set stays small.

use crate::models::performance::{PerformanceRecord, Station};
use crate::models::profile::UserProfile;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of sessions shown in the "recent performances" list.
pub const RECENT_LIMIT: usize = 5;

/// One point of the total-time chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: String,
    pub total_time: u32,
}

/// Summary figures for the benchmarks card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Sessions with a valid date
    pub sessions: u32,
    /// Lowest non-zero total time
    pub personal_best: Option<u32>,
    /// Total time of the most recent session
    pub latest_total_time: Option<u32>,
    /// Mean of the non-zero total times, rounded to the second
    pub average_total_time: Option<u32>,
    /// First logged total minus latest total; positive means faster
    pub improvement: Option<i64>,
    /// Lowest non-zero time per station
    pub station_bests: BTreeMap<Station, u32>,
    /// Personal best minus the profile's target, in seconds
    pub target_gap: Option<i64>,
}

/// Chart series, recent list and summary stats for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Ascending by date
    pub chart: Vec<ChartPoint>,
    /// Descending by date, at most `RECENT_LIMIT` entries
    pub recent: Vec<PerformanceRecord>,
    pub stats: HistoryStats,
}

impl History {
    /// Aggregate records in the order they arrived from the store.
    ///
    /// Records whose date does not parse are left out. Records sharing a date
    /// keep their arrival order in `recent`.
    pub fn from_records(records: Vec<PerformanceRecord>, profile: Option<&UserProfile>) -> Self {
        let dated = sort_newest_first(records);

        let stats = compute_stats(&dated, profile);

        let chart = dated
            .iter()
            .rev()
            .map(|(_, r)| ChartPoint {
                date: r.date.clone(),
                total_time: r.total_time,
            })
            .collect();

        let recent = dated
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|(_, r)| r)
            .collect();

        Self {
            chart,
            recent,
            stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }
}

/// Every record with a valid date, most recent first.
///
/// Same ordering as `History::recent`, without the truncation.
pub fn newest_first(records: Vec<PerformanceRecord>) -> Vec<PerformanceRecord> {
    sort_newest_first(records).into_iter().map(|(_, r)| r).collect()
}

fn sort_newest_first(records: Vec<PerformanceRecord>) -> Vec<(NaiveDate, PerformanceRecord)> {
    let mut dated: Vec<(NaiveDate, PerformanceRecord)> = records
        .into_iter()
        .filter_map(|record| match record.session_date() {
            Some(date) => Some((date, record)),
            None => {
                tracing::debug!(
                    id = ?record.id,
                    date = %record.date,
                    "Excluding performance with malformed date"
                );
                None
            }
        })
        .collect();

    // Stable: equal dates stay in arrival order
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated
}

/// `newest_first` must already be sorted descending by date.
fn compute_stats(
    newest_first: &[(NaiveDate, PerformanceRecord)],
    profile: Option<&UserProfile>,
) -> HistoryStats {
    let totals: Vec<u32> = newest_first
        .iter()
        .map(|(_, r)| r.total_time)
        .filter(|&t| t > 0)
        .collect();

    let personal_best = totals.iter().copied().min();

    let average_total_time = if totals.is_empty() {
        None
    } else {
        let sum: u64 = totals.iter().map(|&t| u64::from(t)).sum();
        let avg = (sum as f64 / totals.len() as f64).round();
        Some(avg as u32)
    };

    // totals is newest-first, so first() is the latest and last() the oldest
    let improvement = match (totals.last(), totals.first()) {
        (Some(&oldest), Some(&latest)) if totals.len() > 1 => {
            Some(i64::from(oldest) - i64::from(latest))
        }
        _ => None,
    };

    let mut station_bests = BTreeMap::new();
    for (_, record) in newest_first {
        for (station, secs) in record.stations.iter().filter(|&(_, s)| s > 0) {
            station_bests
                .entry(station)
                .and_modify(|best: &mut u32| *best = (*best).min(secs))
                .or_insert(secs);
        }
    }

    let target_gap = match (personal_best, profile) {
        (Some(best), Some(p)) if p.target_time > 0 => {
            Some(i64::from(best) - i64::from(p.target_seconds()))
        }
        _ => None,
    };

    HistoryStats {
        sessions: newest_first.len() as u32,
        personal_best,
        latest_total_time: newest_first.first().map(|(_, r)| r.total_time),
        average_total_time,
        improvement,
        station_bests,
        target_gap,
    }
}
