// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profile model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// HYROX race division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Category {
    Open,
    Doubles,
    Elite,
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Category::Open),
            "doubles" => Ok(Category::Doubles),
            "elite" => Ok(Category::Elite),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Open => "Open",
            Category::Doubles => "Doubles",
            Category::Elite => "Elite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(()),
        }
    }
}

/// Athlete profile stored in Firestore at `users/{uid}`.
///
/// Written once at signup and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Account e-mail
    #[serde(default)]
    pub email: String,
    pub category: Category,
    /// Goal finishing time in minutes
    pub target_time: u32,
    pub age: u32,
    pub gender: Gender,
    /// When the account was created (RFC3339)
    pub created_at: String,
}

impl UserProfile {
    /// Target time converted to seconds, the unit records are logged in.
    pub fn target_seconds(&self) -> u32 {
        self.target_time.saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_document_field_names() {
        let profile = UserProfile {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            category: Category::Doubles,
            target_time: 75,
            age: 31,
            gender: Gender::Female,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["targetTime"], 75);
        assert_eq!(value["category"], "Doubles");
        assert_eq!(value["gender"], "female");
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(profile.target_seconds(), 4500);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("elite".parse::<Category>(), Ok(Category::Elite));
        assert_eq!("Open".parse::<Category>(), Ok(Category::Open));
        assert!("Pro".parse::<Category>().is_err());
        assert_eq!("MALE".parse::<Gender>(), Ok(Gender::Male));
    }
}
