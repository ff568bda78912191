// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Performance record model for storage and API.
//!
//! A `PerformanceRecord` is one logged session over the eight HYROX stations.
//! It is the only shape written to the `performances` collection; documents in
//! the older single-station shape are migrated when read (see
//! [`StoredPerformance`]).

use crate::time_utils::{parse_session_date, ISO_DATE};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One of the eight fixed race stations, in race order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum Station {
    Skierg,
    SledPush,
    SledPull,
    BurpeeBroadJumps,
    RowErg,
    FarmerCarry,
    SandbagLunges,
    WallBalls,
}

impl Station {
    pub const ALL: [Station; 8] = [
        Station::Skierg,
        Station::SledPush,
        Station::SledPull,
        Station::BurpeeBroadJumps,
        Station::RowErg,
        Station::FarmerCarry,
        Station::SandbagLunges,
        Station::WallBalls,
    ];

    /// Form / document key.
    pub fn key(self) -> &'static str {
        match self {
            Station::Skierg => "skierg",
            Station::SledPush => "sledPush",
            Station::SledPull => "sledPull",
            Station::BurpeeBroadJumps => "burpeeBroadJumps",
            Station::RowErg => "rowErg",
            Station::FarmerCarry => "farmerCarry",
            Station::SandbagLunges => "sandbagLunges",
            Station::WallBalls => "wallBalls",
        }
    }

    /// Resolve a key or a display label ("Sled Push", "5️⃣ Rowing",
    /// "Fentes marchées", ...) to a station.
    pub fn from_label(label: &str) -> Option<Station> {
        let folded: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        // Numbered labels carry a keycap prefix
        let folded = folded.trim_start_matches(|c: char| c.is_ascii_digit());

        let station = match folded {
            "skierg" | "ski" => Station::Skierg,
            "sledpush" => Station::SledPush,
            "sledpull" => Station::SledPull,
            "burpeebroadjumps" | "burpees" => Station::BurpeeBroadJumps,
            "rowerg" | "rowing" | "row" => Station::RowErg,
            "farmercarry" | "farmerscarry" => Station::FarmerCarry,
            "sandbaglunges" | "fentesmarchées" | "lunges" => Station::SandbagLunges,
            "wallballs" => Station::WallBalls,
            _ => return None,
        };
        Some(station)
    }
}

impl FromStr for Station {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::from_label(s).ok_or(())
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Elapsed seconds per station. Every station is always present; 0 means the
/// station was not attempted or not logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase", default)]
pub struct StationTimes {
    pub skierg: u32,
    pub sled_push: u32,
    pub sled_pull: u32,
    pub burpee_broad_jumps: u32,
    pub row_erg: u32,
    pub farmer_carry: u32,
    pub sandbag_lunges: u32,
    pub wall_balls: u32,
}

impl StationTimes {
    pub fn get(&self, station: Station) -> u32 {
        match station {
            Station::Skierg => self.skierg,
            Station::SledPush => self.sled_push,
            Station::SledPull => self.sled_pull,
            Station::BurpeeBroadJumps => self.burpee_broad_jumps,
            Station::RowErg => self.row_erg,
            Station::FarmerCarry => self.farmer_carry,
            Station::SandbagLunges => self.sandbag_lunges,
            Station::WallBalls => self.wall_balls,
        }
    }

    pub fn set(&mut self, station: Station, seconds: u32) {
        let slot = match station {
            Station::Skierg => &mut self.skierg,
            Station::SledPush => &mut self.sled_push,
            Station::SledPull => &mut self.sled_pull,
            Station::BurpeeBroadJumps => &mut self.burpee_broad_jumps,
            Station::RowErg => &mut self.row_erg,
            Station::FarmerCarry => &mut self.farmer_carry,
            Station::SandbagLunges => &mut self.sandbag_lunges,
            Station::WallBalls => &mut self.wall_balls,
        };
        *slot = seconds;
    }

    /// Iterate stations in race order.
    pub fn iter(&self) -> impl Iterator<Item = (Station, u32)> + '_ {
        Station::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    pub fn sum(&self) -> u64 {
        self.iter().map(|(_, secs)| u64::from(secs)).sum()
    }

    /// True when every station has a non-zero time.
    pub fn all_logged(&self) -> bool {
        self.iter().all(|(_, secs)| secs > 0)
    }
}

/// Stored performance record in Firestore (`performances` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// Document ID, assigned by the store. Never written as a field.
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Owning user (identity provider uid)
    pub user_id: String,
    /// Session date (YYYY-MM-DD)
    pub date: String,
    /// Total session time in seconds
    pub total_time: u32,
    #[serde(default)]
    pub stations: StationTimes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Server-assigned creation timestamp (RFC3339)
    #[serde(default)]
    pub created_at: Option<String>,
}

impl PerformanceRecord {
    /// Calendar date of the session, if the stored date is well-formed.
    pub fn session_date(&self) -> Option<NaiveDate> {
        parse_session_date(&self.date)
    }

    /// Whether the station times add up to more than the logged total.
    ///
    /// `totalTime >= sum(stations)` is expected once all eight stations are
    /// logged but is not enforced: runs between stations are not recorded and
    /// athletes type the total by hand. Partial logs are never flagged.
    pub fn stations_exceed_total(&self) -> bool {
        self.stations.all_logged() && self.stations.sum() > u64::from(self.total_time)
    }
}

/// A single-station log entry, the reduced form some clients submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationEntry {
    pub station: Station,
    pub minutes: u32,
    pub seconds: u32,
    pub total_seconds: u32,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

impl StationEntry {
    /// Migrate into the canonical record shape: only `station` carries time
    /// and the entry's duration becomes the total.
    pub fn into_record(self, user_id: &str) -> PerformanceRecord {
        let mut stations = StationTimes::default();
        stations.set(self.station, self.total_seconds);

        PerformanceRecord {
            id: None,
            user_id: user_id.to_string(),
            date: self.date.format(ISO_DATE).to_string(),
            total_time: self.total_seconds,
            stations,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: None,
        }
    }
}

/// Single-station document as older clients wrote it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStationDocument {
    #[serde(default, alias = "_firestore_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub station: String,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    pub total_seconds: u32,
    #[serde(default)]
    pub notes: Option<String>,
    /// Usually a French locale date (dd/mm/yyyy)
    #[serde(default)]
    pub date: String,
}

impl LegacyStationDocument {
    /// Convert to the canonical shape. `None` if the station label is unknown.
    pub fn migrate(self) -> Option<PerformanceRecord> {
        let station = Station::from_label(&self.station)?;

        // Unparsable dates are kept verbatim; aggregation drops them.
        let date = NaiveDate::parse_from_str(self.date.trim(), "%d/%m/%Y")
            .ok()
            .or_else(|| parse_session_date(&self.date))
            .map(|d| d.format(ISO_DATE).to_string())
            .unwrap_or(self.date);

        let mut stations = StationTimes::default();
        stations.set(station, self.total_seconds);

        Some(PerformanceRecord {
            id: self.id,
            user_id: self.user_id.unwrap_or_default(),
            date,
            total_time: self.total_seconds,
            stations,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: None,
        })
    }
}

/// Any document found in the `performances` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredPerformance {
    Record(PerformanceRecord),
    Legacy(LegacyStationDocument),
}

impl StoredPerformance {
    pub fn into_record(self) -> Option<PerformanceRecord> {
        match self {
            StoredPerformance::Record(record) => Some(record),
            StoredPerformance::Legacy(legacy) => {
                let id = legacy.id.clone();
                let migrated = legacy.migrate();
                if migrated.is_none() {
                    tracing::warn!(id = ?id, "Skipping legacy performance with unknown station");
                }
                migrated
            }
        }
    }
}
