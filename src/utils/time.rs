// src/utils/time.rs

//! Timestamp rendering for post text and archive filenames.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};

/// English ordinal suffix for a day of month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Render a timestamp the way it appears in post text:
/// `Tuesday, October 3rd 2023, 4:45:05 PM`.
pub fn format_display_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let day = at.day();
    format!(
        "{}, {} {}{} {}, {}",
        at.format("%A"),
        at.format("%B"),
        day,
        ordinal_suffix(day),
        at.format("%Y"),
        at.format("%-I:%M:%S %p")
    )
}

/// Build an archive filename: `<base>-<YYYY>-<M>-<D>-<epochMs>.<ext>`.
///
/// Month and day are not zero-padded; existing archives were written that
/// way and readers glob on the prefix.
pub fn timestamped_filename<Tz: TimeZone>(base: &str, extension: &str, at: &DateTime<Tz>) -> String {
    format!(
        "{}-{}-{}-{}-{}.{}",
        base,
        at.year(),
        at.month(),
        at.day(),
        at.timestamp_millis(),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::New_York;

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_display_timestamp() {
        let at = New_York.with_ymd_and_hms(2023, 10, 3, 16, 45, 5).unwrap();
        assert_eq!(
            format_display_timestamp(&at),
            "Tuesday, October 3rd 2023, 4:45:05 PM"
        );
    }

    #[test]
    fn test_display_timestamp_morning_hour_unpadded() {
        let at = New_York.with_ymd_and_hms(2023, 10, 1, 9, 5, 0).unwrap();
        assert_eq!(
            format_display_timestamp(&at),
            "Sunday, October 1st 2023, 9:05:00 AM"
        );
    }

    #[test]
    fn test_timestamped_filename() {
        let at = Utc.with_ymd_and_hms(2023, 10, 3, 12, 0, 0).unwrap();
        assert_eq!(
            timestamped_filename("schedule-screenshot", "png", &at),
            "schedule-screenshot-2023-10-3-1696334400000.png"
        );
    }

    #[test]
    fn test_timestamped_filename_no_zero_padding() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let name = timestamped_filename("schedule", "json", &at);
        assert!(name.starts_with("schedule-2024-1-5-"));
        assert!(name.ends_with(".json"));
    }
}
