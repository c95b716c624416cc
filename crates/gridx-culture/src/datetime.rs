//! Date-time formatting and locale-neutral parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use gridx_model::INVARIANT_DATETIME_FORMAT;

use crate::culture::CultureProfile;

/// Date-time patterns tried after RFC 3339, in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    INVARIANT_DATETIME_FORMAT,
    "%m/%d/%Y %H:%M",
];

/// Date-only patterns; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Formats a date-time with the culture's short date + long time pattern.
pub fn format_datetime(value: NaiveDateTime, culture: &CultureProfile) -> String {
    value.format(culture.datetime_format()).to_string()
}

/// Parses a date-time in the locale-neutral conventions.
///
/// Accepts ISO 8601 dates and date-times (`T` or space separator, optional
/// fractional seconds, `Z` or a numeric offset) and `MM/dd/yyyy[ HH:mm[:ss]]`.
/// Offsets are dropped and the local wall-clock time is kept.
pub fn parse_invariant_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
