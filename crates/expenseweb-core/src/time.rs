//! Timestamp parsing and formatting for expense dates
//!
//! Expense dates arrive as loosely formatted strings. Anything without an
//! explicit offset is read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an expense timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a `YYYY-MM-DD` filter bound
pub fn parse_filter_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Convert a form date into the ISO string sent to the API.
/// Empty or unparseable input becomes `now`.
pub fn form_date_to_iso(raw: &str, now: DateTime<Utc>) -> String {
    let parsed = parse_timestamp(raw).unwrap_or(now);
    to_iso_string(&parsed)
}

/// Card display: `-` when empty, the raw text when unparseable
pub fn display_timestamp(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "-".to_string();
    }
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => raw.to_string(),
    }
}

/// Value for an `<input type="datetime-local">`
pub fn datetime_local_value(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}
