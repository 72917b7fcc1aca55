//! Wall-clock time helpers.
//!
//! Everything here works on local `NaiveDateTime` values. Callers pass the
//! reference instant in explicitly; nothing reads the system clock.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::constants::MINUTES_IN_DAY;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("HH:MM pattern compiles")
});

/// Parse a strict 24-hour "HH:MM" string into minutes after midnight.
///
/// Returns `None` for anything else, including out-of-range fields,
/// single-digit hours and trailing content.
pub fn parse_time_to_minutes(time: &str) -> Option<i64> {
    let caps = TIME_RE.captures(time.trim())?;
    let hours: i64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: i64 = caps.get(2)?.as_str().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Format minutes after midnight as "HH:MM", wrapping into a single day.
pub fn minutes_to_time_string(minutes_total: i64) -> String {
    let safe = minutes_total.rem_euclid(MINUTES_IN_DAY);
    format!("{:02}:{:02}", safe / 60, safe % 60)
}

pub fn add_minutes(at: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    at + Duration::minutes(minutes)
}

pub fn add_days(at: NaiveDateTime, days: i64) -> NaiveDateTime {
    at + Duration::days(days)
}

/// Anchor "HH:MM" onto the calendar day of `day`, with zero seconds.
pub fn set_time_on_date(day: NaiveDateTime, time: &str) -> Option<NaiveDateTime> {
    let minutes = parse_time_to_minutes(time)?;
    let t = NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)?;
    Some(day.date().and_time(t))
}

/// Calendar key ("YYYY-MM-DD") for the day containing `at`.
pub fn date_key(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Whole minutes from `from` to `to`, rounded up. Negative spans clamp to 0.
pub fn minutes_until_ceil(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + 59_999) / 60_000
}

/// Parse a local instant like "2026-02-20 23:59".
pub fn parse_local_instant(local: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(local.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{local}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn time_pattern_compiles() {
        assert!(TIME_RE.is_match("12:34"));
        assert!(!TIME_RE.is_match("12:345"));
    }

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_time_to_minutes("07:00"), Some(420));
        assert_eq!(parse_time_to_minutes("00:00"), Some(0));
        assert_eq!(parse_time_to_minutes("23:59"), Some(1439));
        assert_eq!(parse_time_to_minutes(" 08:30 "), Some(510));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "7:00", "07:60", "07:00:00", "07:00x", "", "ab:cd", "-1:00"] {
            assert_eq!(parse_time_to_minutes(bad), None, "{bad}");
        }
    }

    #[test]
    fn minutes_to_string_wraps() {
        assert_eq!(minutes_to_time_string(420), "07:00");
        assert_eq!(minutes_to_time_string(1440 + 5), "00:05");
        assert_eq!(minutes_to_time_string(-60), "23:00");
    }

    #[test]
    fn set_time_zeroes_seconds() {
        let anchored = set_time_on_date(at(15, 42, 17), "07:30").unwrap();
        assert_eq!(anchored, at(7, 30, 0));
        assert!(set_time_on_date(at(15, 42, 17), "7:30").is_none());
    }

    #[test]
    fn ceil_minutes() {
        assert_eq!(minutes_until_ceil(at(10, 0, 0), at(10, 30, 0)), 30);
        assert_eq!(minutes_until_ceil(at(10, 0, 1), at(10, 30, 0)), 30);
        assert_eq!(minutes_until_ceil(at(10, 30, 0), at(10, 0, 0)), 0);
    }

    #[test]
    fn parses_local_instant() {
        let t = parse_local_instant("2026-03-14 07:05").unwrap();
        assert_eq!(t, at(7, 5, 0));
        assert_eq!(date_key(t), "2026-03-14");
        assert!(parse_local_instant("tomorrow").is_err());
    }
}
