//! Spending analytics over historical order records.
//!
//! Read-only aggregations against the Supabase REST surface; the heavy
//! lifting is plain in-process bucketing, mirroring what the mobile app
//! charts.

pub mod handlers;
pub mod models;
pub mod store;

pub use store::{AnalyticsError, AnalyticsStore};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Supabase rows carry mixed ISO-8601 flavors ("Z", explicit offset, or
/// offset-free); parse tolerantly and compare as naive timestamps.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Start of the current month and start of the next, as naive timestamps.
pub(crate) fn month_bounds(today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .unwrap_or(today)
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid");
    let next = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .unwrap_or(today)
    .and_hms_opt(0, 0, 0)
    .expect("midnight is always valid");
    (start, next)
}

/// "2025年12月"-style label for the current month.
pub(crate) fn japanese_period(today: NaiveDate) -> String {
    format!("{}年{}月", today.year(), today.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_supabase_timestamp_flavors() {
        assert!(parse_timestamp("2025-12-01T09:30:00Z").is_some());
        assert!(parse_timestamp("2025-12-01T09:30:00+09:00").is_some());
        assert!(parse_timestamp("2025-12-01T09:30:00.123456").is_some());
        assert!(parse_timestamp("2025-12-01 09:30:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn month_bounds_wrap_the_year() {
        let december = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        let (start, next) = month_bounds(december);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn period_label_is_japanese() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        assert_eq!(japanese_period(date), "2025年12月");
    }
}
