//! Calendar-date parsing and display helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a review timestamp.
///
/// Accepts RFC 3339 (kept at the wall-clock time of its own offset),
/// `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]` and bare
/// `YYYY-MM-DD` (midnight). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a `YYYY-MM-DD` calendar date (the date-picker format).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Format a review date for display, e.g. `"September 4, 2025"`.
///
/// Unparseable input is returned unchanged; empty input yields `""`.
pub fn format_display_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}
