// crates/podcast-feed/src/date.rs
//! Publish date parsing and RFC 2822 formatting

use crate::error::{FeedError, FeedResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// `pubDate` layout: two-digit day and a numeric offset
const RFC2822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Parses a textual publish date
///
/// Accepts RFC 3339, RFC 2822 and the common ISO-like variants. Values
/// without an offset are taken as UTC.
pub fn parse_date(s: &str) -> FeedResult<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(FeedError::InvalidDate("empty date".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt);
    }

    let formats_with_tz = [
        // "2024-01-01T10:00:00.500+02:00"
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        // "2024-01-01T10:00:00+0200"
        "%Y-%m-%dT%H:%M:%S%z",
        // "2024-01-01 10:00:00+02:00"
        "%Y-%m-%d %H:%M:%S%:z",
        // "2024-01-01 10:00:00 +0200"
        "%Y-%m-%d %H:%M:%S %z",
    ];

    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    Err(FeedError::InvalidDate(s.to_string()))
}

/// Formats a date for `<pubDate>`, e.g. `Mon, 01 Jan 2024 00:00:00 +0000`
pub fn format_rfc2822(dt: &DateTime<FixedOffset>) -> String {
    dt.format(RFC2822_FORMAT).to_string()
}

/// Current wall-clock time
pub(crate) fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_date("2024-01-01T00:00:00Z").expect("valid");
        assert_eq!(format_rfc2822(&dt), "Mon, 01 Jan 2024 00:00:00 +0000");
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let dt = parse_date("2024-03-05T10:30:00+02:00").expect("valid");
        assert_eq!(format_rfc2822(&dt), "Tue, 05 Mar 2024 10:30:00 +0200");
    }

    #[test]
    fn test_parse_rfc2822() {
        let dt = parse_date("Tue, 02 Jan 2024 12:00:00 GMT").expect("valid");
        assert_eq!(dt.day(), 2);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let dt = parse_date("2024-01-01 10:00:00").expect("valid");
        assert_eq!(format_rfc2822(&dt), "Mon, 01 Jan 2024 10:00:00 +0000");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_date("2024-02-29").expect("valid");
        assert_eq!(format_rfc2822(&dt), "Thu, 29 Feb 2024 00:00:00 +0000");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_date("not a date"), Err(FeedError::InvalidDate(_))));
        assert!(matches!(parse_date("   "), Err(FeedError::InvalidDate(_))));
        assert!(matches!(parse_date("2024-13-45"), Err(FeedError::InvalidDate(_))));
    }

    #[test]
    fn test_dates_compare_by_instant() {
        let a = parse_date("2024-01-01T12:00:00+02:00").expect("valid");
        let b = parse_date("2024-01-01T11:00:00Z").expect("valid");
        assert!(b > a);
    }
}
