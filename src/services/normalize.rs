// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turning raw form input into typed records and accounts.
//!
//! Everything here is pure: nothing is written until a form has been fully
//! normalized, so a validation failure never leaves a partial write behind.

use crate::error::ValidationError;
use crate::models::{Category, Gender, PerformanceRecord, Station, StationEntry, StationTimes};
use crate::time_utils::{parse_session_date, ISO_DATE};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// A form as posted: any JSON object.
pub type FormBody = serde_json::Map<String, serde_json::Value>;

/// Field name to raw value, as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm(BTreeMap<String, String>);

impl RawForm {
    /// Build from a JSON object. Strings are kept verbatim, numbers and
    /// booleans are rendered as text, nulls are dropped.
    ///
    /// A nested `stations` object (the shape records are returned in) is
    /// flattened into the form; top-level fields win over nested ones. Any
    /// other nested value is dropped.
    pub fn from_json(map: FormBody) -> Self {
        use serde_json::Value;

        let mut fields = BTreeMap::new();
        let mut nested = None;
        for (key, value) in map {
            match value {
                Value::Object(inner) if key == "stations" => nested = Some(inner),
                value => {
                    if let Some(raw) = scalar_text(value) {
                        fields.insert(key, raw);
                    }
                }
            }
        }

        for (key, value) in nested.into_iter().flatten() {
            if let Some(raw) = scalar_text(value) {
                fields.entry(key).or_insert(raw);
            }
        }

        Self(fields)
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value exactly as sent, empty when absent.
    pub fn verbatim(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    /// Non-negative integer value; anything else counts as 0.
    ///
    /// Only the leading digits are read, so `"5400.5"` and `"12abc"` give
    /// 5400 and 12.
    pub fn number_or_zero(&self, field: &str) -> u32 {
        self.text(field).and_then(leading_integer).unwrap_or(0)
    }
}

fn scalar_text(value: serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The run of digits at the start of `raw`, after an optional `+`.
///
/// `None` for negative numbers, values with no leading digit and values
/// past `u32::MAX`.
pub fn leading_integer(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..end].parse().ok()
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Normalize the multi-station entry form.
///
/// `date` is the only required field. `totalTime` and every station default
/// to 0 when missing or not a non-negative integer. The owner is always
/// `user_id`; a `userId` field in the form is ignored.
pub fn normalize_performance(
    form: &RawForm,
    user_id: &str,
) -> Result<PerformanceRecord, ValidationError> {
    let raw_date = form.text("date").ok_or(ValidationError::MissingField("date"))?;
    let date = parse_session_date(raw_date)
        .ok_or_else(|| ValidationError::InvalidDate(raw_date.to_string()))?;

    let mut stations = StationTimes::default();
    for station in Station::ALL {
        stations.set(station, form.number_or_zero(station.key()));
    }

    Ok(PerformanceRecord {
        id: None,
        user_id: user_id.to_string(),
        date: date.format(ISO_DATE).to_string(),
        total_time: form.number_or_zero("totalTime"),
        stations,
        notes: form.text("notes").map(str::to_string),
        created_at: None,
    })
}

/// Normalize the single-station form.
///
/// `station` and `minutes` are required; `seconds` defaults to 0. Without a
/// `date` the entry is logged for `today`.
pub fn normalize_station_entry(
    form: &RawForm,
    today: NaiveDate,
) -> Result<StationEntry, ValidationError> {
    let station = form
        .text("station")
        .ok_or(ValidationError::MissingField("station"))?;
    let station = Station::from_label(station).ok_or(ValidationError::InvalidField("station"))?;

    let minutes = form
        .text("minutes")
        .ok_or(ValidationError::MissingField("minutes"))
        .and_then(|raw| leading_integer(raw).ok_or(ValidationError::InvalidField("minutes")))?;
    let seconds = form.number_or_zero("seconds");

    let total_seconds = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or(ValidationError::InvalidField("minutes"))?;

    let date = match form.text("date") {
        Some(raw) => {
            parse_session_date(raw).ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))?
        }
        None => today,
    };

    Ok(StationEntry {
        station,
        minutes,
        seconds,
        total_seconds,
        notes: form.text("notes").map(str::to_string),
        date,
    })
}

/// Signup form.
#[derive(Debug, Clone, Default, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub category: String,
    /// Goal time in minutes
    #[validate(range(min = 1))]
    pub target_time: u32,
    #[validate(range(min = 1))]
    pub age: u32,
    pub gender: String,
}

/// A signup that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub category: Category,
    pub target_time: u32,
    pub age: u32,
    pub gender: Gender,
}

impl SignupRequest {
    /// Read the signup fields. Numbers are read leniently; anything that is
    /// not a positive integer becomes 0 and fails validation.
    pub fn from_form(form: &RawForm) -> Self {
        Self {
            email: form.verbatim("email").to_string(),
            password: form.verbatim("password").to_string(),
            confirm_password: form.verbatim("confirmPassword").to_string(),
            name: form.verbatim("name").to_string(),
            category: form.verbatim("category").to_string(),
            target_time: form.number_or_zero("targetTime"),
            age: form.number_or_zero("age"),
            gender: form.verbatim("gender").to_string(),
        }
    }

    /// Validate the form.
    ///
    /// Password confirmation is checked first; every other problem is
    /// reported to the user as "fill all fields".
    pub fn into_account(mut self) -> Result<NewAccount, ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.validate().map_err(|e| first_failure(&e))?;

        let category = self
            .category
            .parse()
            .map_err(|_| ValidationError::InvalidField("category"))?;
        let gender = self
            .gender
            .parse()
            .map_err(|_| ValidationError::InvalidField("gender"))?;

        Ok(NewAccount {
            email: self.email,
            password: self.password,
            name: self.name,
            category,
            target_time: self.target_time,
            age: self.age,
            gender,
        })
    }
}

fn first_failure(errors: &ValidationErrors) -> ValidationError {
    let fields = errors.field_errors();
    if fields.contains_key("password") {
        return ValidationError::PasswordTooShort;
    }

    [
        ("name", "name"),
        ("email", "email"),
        ("target_time", "targetTime"),
        ("age", "age"),
    ]
    .into_iter()
    .find(|(field, _)| fields.contains_key(*field))
    .map(|(_, api_name)| ValidationError::InvalidField(api_name))
    .unwrap_or(ValidationError::MissingField("form"))
}

/// Login form.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_form(form: &RawForm) -> Self {
        Self {
            email: form.verbatim("email").to_string(),
            password: form.verbatim("password").to_string(),
        }
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}
