//! Date-range input: validation, review filtering and quick presets.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::error::FilterError;
use crate::cache;
use crate::model::Review;
use crate::utils::dates;

// ---------------------------------------------------------------------------
// Validated range
// ---------------------------------------------------------------------------

/// An inclusive calendar-date range, keeping the literal input strings for
/// cache keys and status text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_raw: String,
    pub end_raw: String,
}

impl DateRange {
    /// Cache key built from the literal input strings.
    pub fn cache_key(&self) -> String {
        cache::filter_key(&self.start_raw, &self.end_raw)
    }

    /// First instant inside the range.
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last instant inside the range (`23:59:59.999` on the end date).
    pub fn upper_bound(&self) -> NaiveDateTime {
        let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.end.and_time(last_ms)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.lower_bound() && at <= self.upper_bound()
    }
}

/// Check raw date-picker input and build a [`DateRange`].
///
/// Both dates must be present and be `YYYY-MM-DD` calendar dates, and the
/// start may not fall after the end (equal dates are a one-day range).
pub fn validate(start: &str, end: &str) -> Result<DateRange, FilterError> {
    let (start_raw, end_raw) = (start.trim(), end.trim());
    if start_raw.is_empty() || end_raw.is_empty() {
        return Err(FilterError::Validation(
            "Please select both start and end dates".to_string(),
        ));
    }

    let parse = |raw: &str| {
        dates::parse_date(raw)
            .ok_or_else(|| FilterError::Validation(format!("Invalid date: {raw}")))
    };
    let start = parse(start_raw)?;
    let end = parse(end_raw)?;

    if start > end {
        return Err(FilterError::Validation(
            "Start date must be before end date".to_string(),
        ));
    }

    Ok(DateRange {
        start,
        end,
        start_raw: start_raw.to_string(),
        end_raw: end_raw.to_string(),
    })
}

/// Reviews whose date falls inside `range`, in input order.
///
/// Reviews without a parseable date never match. An empty result is
/// [`FilterError::EmptyResult`].
pub fn filter_by_date(reviews: &[Review], range: &DateRange) -> Result<Vec<Review>, FilterError> {
    let filtered: Vec<Review> = reviews
        .iter()
        .filter(|r| r.timestamp().is_some_and(|ts| range.contains(ts)))
        .cloned()
        .collect();

    if filtered.is_empty() {
        Err(FilterError::EmptyResult)
    } else {
        Ok(filtered)
    }
}

// ---------------------------------------------------------------------------
// Quick ranges
// ---------------------------------------------------------------------------

/// Preset ranges offered next to the date pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    Last30Days,
    Last6Months,
    LastYear,
    Year(i32),
    Span(i32, i32),
}

impl QuickRange {
    /// Every preset in menu order.
    pub const ALL: [QuickRange; 10] = [
        QuickRange::Last30Days,
        QuickRange::Last6Months,
        QuickRange::LastYear,
        QuickRange::Year(2024),
        QuickRange::Year(2023),
        QuickRange::Year(2022),
        QuickRange::Year(2021),
        QuickRange::Year(2020),
        QuickRange::Span(2015, 2019),
        QuickRange::Span(2010, 2014),
    ];

    /// Identifier used on the command line and in the web API.
    pub fn id(self) -> String {
        match self {
            Self::Last30Days => "last30".to_string(),
            Self::Last6Months => "last6months".to_string(),
            Self::LastYear => "lastyear".to_string(),
            Self::Year(y) => y.to_string(),
            Self::Span(a, b) => format!("{a}-{b}"),
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Last30Days => "Last 30 days".to_string(),
            Self::Last6Months => "Last 6 months".to_string(),
            Self::LastYear => "Last year".to_string(),
            Self::Year(y) => y.to_string(),
            Self::Span(a, b) => format!("{a}\u{2013}{b}"),
        }
    }

    /// Look up a preset by its identifier.
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|q| q.id() == id)
    }

    /// Start and end dates relative to `today`.
    ///
    /// Month arithmetic clamps to the end of a shorter month (Aug 31 minus
    /// six months is Feb 28/29).
    pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Last30Days => (today - chrono::Duration::days(30), today),
            Self::Last6Months => (
                today.checked_sub_months(Months::new(6)).unwrap_or(today),
                today,
            ),
            Self::LastYear => (
                today.checked_sub_months(Months::new(12)).unwrap_or(today),
                today,
            ),
            Self::Year(y) => (year_start(y, today), year_end(y, today)),
            Self::Span(a, b) => (year_start(a, today), year_end(b, today)),
        }
    }

    /// Resolve to the `YYYY-MM-DD` strings a date picker would hold.
    pub fn resolve_strings(self, today: NaiveDate) -> (String, String) {
        let (start, end) = self.resolve(today);
        (
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        )
    }
}

fn year_start(year: i32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(fallback.with_day(1).unwrap_or(fallback))
}

fn year_end(year: i32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(fallback)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dated(date: &str) -> Review {
        serde_json::from_value(json!({"date": date, "analysis": {"sentiment": "positive"}})).unwrap()
    }

    #[test]
    fn validate_requires_both_dates() {
        let err = validate("", "2024-01-01").unwrap_err();
        assert_eq!(err.to_string(), "Please select both start and end dates");
        assert!(validate("2024-01-01", "  ").is_err());
    }

    #[test]
    fn validate_rejects_reversed_range() {
        let err = validate("2024-02-01", "2024-01-01").unwrap_err();
        assert_eq!(err.to_string(), "Start date must be before end date");
    }

    #[test]
    fn validate_rejects_non_dates() {
        assert!(matches!(
            validate("2024-02-30", "2024-03-01"),
            Err(FilterError::Validation(_))
        ));
    }

    #[test]
    fn same_day_range_is_valid() {
        let range = validate("2024-05-05", "2024-05-05").unwrap();
        assert_eq!(range.cache_key(), "filter_2024-05-05_2024-05-05");
    }

    #[test]
    fn end_date_includes_whole_day() {
        let reviews = vec![
            dated("2024-01-31T23:59:59"),
            dated("2024-02-01T00:00:00"),
            dated("2024-01-01"),
            dated("2023-12-31T23:59:59"),
        ];
        let range = validate("2024-01-01", "2024-01-31").unwrap();
        let hits = filter_by_date(&reviews, &range).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].date.as_deref(), Some("2024-01-31T23:59:59"));
    }

    #[test]
    fn undated_reviews_never_match() {
        let reviews = vec![Review::default(), dated("3 weeks ago")];
        let range = validate("2000-01-01", "2100-01-01").unwrap();
        assert_eq!(filter_by_date(&reviews, &range), Err(FilterError::EmptyResult));
    }

    #[test]
    fn presets_resolve_to_calendar_spans() {
        let today = d(2025, 8, 31);

        assert_eq!(QuickRange::Last30Days.resolve(today), (d(2025, 8, 1), today));
        assert_eq!(QuickRange::Last6Months.resolve(today), (d(2025, 2, 28), today));
        assert_eq!(QuickRange::LastYear.resolve(today), (d(2024, 8, 31), today));
        assert_eq!(
            QuickRange::Year(2022).resolve(today),
            (d(2022, 1, 1), d(2022, 12, 31))
        );
        assert_eq!(
            QuickRange::Span(2015, 2019).resolve(today),
            (d(2015, 1, 1), d(2019, 12, 31))
        );
    }

    #[test]
    fn presets_parse_by_id() {
        assert_eq!(QuickRange::parse("last6months"), Some(QuickRange::Last6Months));
        assert_eq!(QuickRange::parse("2010-2014"), Some(QuickRange::Span(2010, 2014)));
        assert_eq!(QuickRange::parse("2019"), None);
        assert_eq!(QuickRange::ALL.len(), 10);
    }
}
