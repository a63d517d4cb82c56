// src/models/schedule.rs

//! Schedule data structures and their canonical JSON form.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

static DAY_OF_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}$").unwrap());

/// A single occurrence on a schedule page.
///
/// Field order matches the persisted JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Uppercase day name, or empty when the source row carries none
    pub day_of_week: String,

    /// Short date `M/D`, no zero padding
    pub day_of_month: String,

    /// Venue text; empty only for degenerate rows
    pub location: String,

    /// `HH:MM` or `HH:MM-HH:MM`, AM/PM stripped; empty when the row has no time
    pub time_block: String,

    /// Activity description preceding the venue, if any
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purpose: String,

    /// Derived timestamp. Non-authoritative: accepted on input, never used
    /// for equality, and not populated by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_time: Option<DateTime<Utc>>,
}

impl ScheduleEntry {
    /// Canonical map key: `"DOW, M/D"` with a day name, bare `M/D` without.
    pub fn key(&self) -> String {
        if self.day_of_week.is_empty() {
            self.day_of_month.clone()
        } else {
            format!("{}, {}", self.day_of_week, self.day_of_month)
        }
    }

    /// Content equality for diffing: purpose, location, and time block only.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.purpose == other.purpose
            && self.location == other.location
            && self.time_block == other.time_block
    }

    /// True when neither a time nor a location was parsed out of the row.
    pub fn is_degenerate(&self) -> bool {
        self.location.is_empty() && self.time_block.is_empty()
    }
}

// parsed_time is a derived cache, not part of an entry's identity.
impl PartialEq for ScheduleEntry {
    fn eq(&self, other: &Self) -> bool {
        self.day_of_week == other.day_of_week
            && self.day_of_month == other.day_of_month
            && self.location == other.location
            && self.time_block == other.time_block
            && self.purpose == other.purpose
    }
}

impl Eq for ScheduleEntry {}

/// An unordered mapping from entry key to entry.
///
/// `BTreeMap` keeps the serialized form deterministic (keys ascending).
pub type Schedule = BTreeMap<String, ScheduleEntry>;

/// Validate the short-date form `M/D`.
pub fn is_valid_day_of_month(value: &str) -> bool {
    DAY_OF_MONTH_RE.is_match(value)
}

/// Serialize a schedule to its canonical JSON bytes.
pub fn serialize_schedule(schedule: &Schedule) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(schedule)?)
}

/// Deserialize schedule JSON. Empty or null input yields an empty schedule.
pub fn deserialize_schedule(bytes: &[u8]) -> Result<Schedule> {
    if bytes.is_empty() || bytes == &b"null"[..] {
        return Ok(Schedule::new());
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dow: &str, dom: &str, location: &str, time_block: &str) -> ScheduleEntry {
        ScheduleEntry {
            day_of_week: dow.to_string(),
            day_of_month: dom.to_string(),
            location: location.to_string(),
            time_block: time_block.to_string(),
            purpose: String::new(),
            parsed_time: None,
        }
    }

    #[test]
    fn test_key_with_day_of_week() {
        assert_eq!(
            entry("TUESDAY", "10/3", "Warren", "4:45-6:45").key(),
            "TUESDAY, 10/3"
        );
    }

    #[test]
    fn test_key_without_day_of_week() {
        assert_eq!(entry("", "11/19", "BTC", "6:00-7:30").key(), "11/19");
    }

    #[test]
    fn test_day_of_month_validation() {
        assert!(is_valid_day_of_month("10/3"));
        assert!(is_valid_day_of_month("11/19"));
        assert!(!is_valid_day_of_month("2023/10/3"));
        assert!(!is_valid_day_of_month("10/3/"));
        assert!(!is_valid_day_of_month(""));
    }

    #[test]
    fn test_equality_ignores_parsed_time() {
        let a = entry("FRIDAY", "10/13", "Eliot", "4:15");
        let mut b = a.clone();
        b.parsed_time = Some(Utc::now());
        assert_eq!(a, b);
        assert!(a.content_eq(&b));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut schedule = Schedule::new();
        let mut e = entry("FRIDAY", "10/13", "Eliot", "4:15");
        e.purpose = "Scrimmage".to_string();
        schedule.insert(e.key(), e);
        schedule.insert("11/19".to_string(), entry("", "11/19", "BTC", "6:00-7:30"));

        let bytes = serialize_schedule(&schedule).unwrap();
        let restored = deserialize_schedule(&bytes).unwrap();
        assert_eq!(schedule, restored);
    }

    #[test]
    fn test_serialized_keys_ascending() {
        let mut schedule = Schedule::new();
        schedule.insert("b".to_string(), entry("", "9/2", "Warren", ""));
        schedule.insert("a".to_string(), entry("", "9/1", "Warren", ""));

        let json = String::from_utf8(serialize_schedule(&schedule).unwrap()).unwrap();
        assert!(json.find("\"a\"").unwrap() < json.find("\"b\"").unwrap());
    }

    #[test]
    fn test_empty_purpose_omitted_from_json() {
        let mut schedule = Schedule::new();
        schedule.insert("11/19".to_string(), entry("", "11/19", "BTC", "6:00"));
        let json = String::from_utf8(serialize_schedule(&schedule).unwrap()).unwrap();
        assert!(!json.contains("purpose"));
        assert!(!json.contains("parsedTime"));
    }

    #[test]
    fn test_deserialize_empty_bytes() {
        assert!(deserialize_schedule(b"").unwrap().is_empty());
        assert!(deserialize_schedule(b"null").unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_tolerates_parsed_time() {
        let json = r#"{"SATURDAY, 10/7": {"dayOfWeek":"SATURDAY","dayOfMonth":"10/7","location":"Practice is canceled","timeBlock":"","parsedTime":"2023-10-07T09:00:00Z"}}"#;
        let schedule = deserialize_schedule(json.as_bytes()).unwrap();
        let entry = &schedule["SATURDAY, 10/7"];
        assert!(entry.parsed_time.is_some());
        assert_eq!(entry.location, "Practice is canceled");
    }
}
