// src/pipeline/extract.rs

//! Schedule extraction from captured page fragments.
//!
//! The capture layer hands over an HTML fragment scoped to the schedule
//! region of the page. The extractor walks its text nodes, classifying each
//! as a date header, a short-date row, or an activity row, and assembles a
//! keyed [`Schedule`]. When the fragment yields nothing usable (plain-text
//! input, broken markup) a regex scan over the normalized text runs instead.
//!
//! Malformed input produces an empty schedule, never an error.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::warn;

use crate::models::{Schedule, ScheduleEntry};
use crate::pipeline::normalize::normalize;

/// Phrase opening the first non-schedule section on the monitored pages.
/// Nothing at or past this marker belongs to the schedule.
const REGION_TERMINATOR: &str = "Schedule by Season";

static LONG_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SUNDAY|MONDAY|TUESDAY|WEDNESDAY|THURSDAY|FRIDAY|SATURDAY),\s*(\d{1,2}/\d{1,2})$")
        .unwrap()
});

static LONG_DATE_SCAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(SUNDAY|MONDAY|TUESDAY|WEDNESDAY|THURSDAY|FRIDAY|SATURDAY),\s*(\d{1,2}/\d{1,2})")
        .unwrap()
});

static SHORT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}/\d{1,2})\s*:\s*(.+)$").unwrap());

static SHORT_DATE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\d{1,2}/\d{1,2})\s*:\s*(.+)$").unwrap());

static TIME_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+:\d+(-\d+:\d+)?(am|pm)?").unwrap());

static TIME_HINT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+:\d+").unwrap());

/// Extract a schedule from a captured HTML fragment or plain text.
pub fn extract_schedule(input: &str) -> Schedule {
    if input.trim().is_empty() {
        return Schedule::new();
    }

    let schedule = extract_from_html(input);
    if !schedule.is_empty() {
        return schedule;
    }

    // Broken markup or plain text: fall back to regex scanning.
    extract_from_text(input)
}

/// Walk the fragment's text nodes in document order.
///
/// A long-form date header becomes the pending key for the next activity
/// row, which consumes it. Short-date rows are self-contained.
fn extract_from_html(html: &str) -> Schedule {
    let document = Html::parse_fragment(html);
    let mut schedule = Schedule::new();
    let mut pending: Option<(String, String)> = None;

    for node in document.root_element().descendants() {
        let Some(raw) = node.value().as_text() else {
            continue;
        };
        if raw.contains(REGION_TERMINATOR) {
            break;
        }
        let text = normalize(raw);
        if text.is_empty() {
            continue;
        }

        if let Some(caps) = LONG_DATE_RE.captures(&text) {
            pending = Some((caps[1].to_uppercase(), caps[2].to_string()));
        } else if let Some(caps) = SHORT_DATE_RE.captures(&text) {
            let (purpose, location, time_block) = parse_activity_row(&caps[2]);
            insert_entry(
                &mut schedule,
                build_entry(String::new(), caps[1].to_string(), purpose, location, time_block),
            );
        } else if is_activity_row(&text) {
            // Footers and paragraphs that look like activities but follow no
            // date header are dropped.
            if let Some((day_of_week, day_of_month)) = pending.take() {
                let (purpose, location, time_block) = parse_activity_row(&text);
                insert_entry(
                    &mut schedule,
                    build_entry(day_of_week, day_of_month, purpose, location, time_block),
                );
            }
        }
    }

    schedule
}

/// Regex fallback over normalized text: one pass slicing content between
/// long-form date headers, one pass over short-date lines. Both passes write
/// into the same map.
fn extract_from_text(input: &str) -> Schedule {
    let mut text = normalize(input);
    if let Some(idx) = text.find(REGION_TERMINATOR) {
        text.truncate(idx);
    }

    let mut schedule = Schedule::new();

    let headers: Vec<regex::Captures<'_>> = LONG_DATE_SCAN_RE.captures_iter(&text).collect();
    for (i, caps) in headers.iter().enumerate() {
        let whole = caps.get(0).unwrap();
        let start = whole.end();
        let end = headers
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(text.len());

        let (purpose, location, time_block) = parse_activity_row(&text[start..end]);
        let entry = build_entry(
            caps[1].to_uppercase(),
            caps[2].to_string(),
            purpose,
            location,
            time_block,
        );
        if entry.is_degenerate() {
            continue;
        }
        insert_entry(&mut schedule, entry);
    }

    for caps in SHORT_DATE_LINE_RE.captures_iter(&text) {
        let (purpose, location, time_block) = parse_activity_row(&caps[2]);
        let entry = build_entry(String::new(), caps[1].to_string(), purpose, location, time_block);
        if entry.is_degenerate() {
            continue;
        }
        insert_entry(&mut schedule, entry);
    }

    schedule
}

/// An activity row names at least two comma-separated things and either a
/// clock time or a known activity word.
fn is_activity_row(text: &str) -> bool {
    if !text.contains(',') {
        return false;
    }
    let lower = text.to_lowercase();
    TIME_HINT_RE.is_match(text) || lower.contains("practice") || lower.contains("game")
}

/// Split an activity row into `(purpose, location, time_block)`.
///
/// The first clock-time match becomes the time block (AM/PM suffix
/// stripped). The text before it splits on commas: the last non-empty part
/// is the venue, anything before it is the activity description.
fn parse_activity_row(text: &str) -> (String, String, String) {
    let text = normalize(text);

    if let Some(m) = TIME_BLOCK_RE.find(&text) {
        let matched = m.as_str();
        let time_block = matched
            .strip_suffix("am")
            .or_else(|| matched.strip_suffix("pm"))
            .unwrap_or(matched)
            .to_string();
        let (purpose, location) = split_purpose_location(&text[..m.start()]);
        (purpose, location, time_block)
    } else {
        let (purpose, location) = split_purpose_location(&text);
        (purpose, location, String::new())
    }
}

fn split_purpose_location(text: &str) -> (String, String) {
    let parts: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (String::new(), (*only).to_string()),
        [init @ .., last] => (init.join(", "), (*last).to_string()),
    }
}

fn build_entry(
    day_of_week: String,
    day_of_month: String,
    purpose: String,
    location: String,
    time_block: String,
) -> ScheduleEntry {
    ScheduleEntry {
        day_of_week,
        day_of_month,
        location,
        time_block,
        purpose,
        parsed_time: None,
    }
}

fn insert_entry(schedule: &mut Schedule, entry: ScheduleEntry) {
    let key = entry.key();
    if schedule.insert(key.clone(), entry).is_some() {
        warn!(key = %key, "duplicate schedule key, keeping the later entry");
    }
}
