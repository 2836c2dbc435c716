//! # Dates and Timestamps
//!
//! Stored timestamps are RFC 3339 UTC strings with millisecond precision so
//! that lexical order equals chronological order. Business dates (license
//! expiry, expense date) are accepted as `YYYY-MM-DD` or any RFC 3339 string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Current time as a stored timestamp string.
pub fn now_rfc3339() -> String {
    format_timestamp(Utc::now())
}

/// Format a timestamp the way the store writes it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a business date.
///
/// Accepts `2025-06-01`, `2025-06-01T10:00:00`, and full RFC 3339 strings
/// (the calendar date of the UTC instant is returned).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_date("2025-06-01"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn parses_rfc3339_as_utc_date() {
        assert_eq!(
            parse_date("2025-06-01T23:30:00-02:00"),
            NaiveDate::from_ymd_opt(2025, 6, 2)
        );
    }

    #[test]
    fn parses_naive_datetime() {
        assert_eq!(
            parse_date("2025-06-01T08:00:00"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("01/06/2025"), None);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn timestamps_sort_lexically() {
        let a = format_timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let b = format_timestamp(DateTime::from_timestamp(1_700_000_001, 5_000_000).unwrap());
        assert!(a < b);
        assert!(a.ends_with('Z'));
    }
}
