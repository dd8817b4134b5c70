//! Lenient parsing of the assorted date and date-time strings found in bank
//! exports.
//!
//! The ambiguity policy is fixed: a leading field is never taken to be the
//! year unless it has four digits, and a numeric `a/b/c` date is read as
//! month/day/year. Day/month/year is only used when the month-first reading
//! is impossible (e.g. `13/02/2023`).
//!
//! Only the calendar date is kept. Any time of day and UTC offset are
//! dropped *without* converting between time zones, so the date is the one
//! written in the string.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

/// Date-time formats that carry a UTC offset, tried after RFC 3339.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Date-time formats without an offset.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f UTC",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only formats. Order matters: month-first variants come before their
/// day-first counterparts, and `%y` before `%Y` because `%Y` also accepts a
/// two digit year.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%a %b %d %Y",
    "%a, %d %b %Y",
];

/// Parses `s` into a date, accepting many common textual formats. Returns
/// `None` if no supported format matches.
pub fn parse_date_liberally(s: &str) -> Option<NaiveDate> {
    lazy_static! {
        static ref ORDINAL_RX: Regex = Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap();
        static ref SPACES_RX: Regex = Regex::new(r"\s+").unwrap();
    }

    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    let cleaned = ORDINAL_RX.replace_all(s, "$1");
    let cleaned = SPACES_RX.replace_all(&cleaned, " ");
    let cleaned: &str = &cleaned;
    let year_first = starts_with_year(cleaned);
    let formats = |formats: &'static [&'static str]| {
        formats
            .iter()
            .filter(move |fmt| year_first || !fmt.starts_with("%Y"))
    };

    formats(OFFSET_DATETIME_FORMATS)
        .find_map(|fmt| DateTime::parse_from_str(cleaned, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            formats(NAIVE_DATETIME_FORMATS)
                .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            formats(DATE_FORMATS)
                .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        })
}

/// Year-first formats only apply to strings that open with a four digit
/// year, as `%Y` would otherwise take e.g. the `01` of `01/02/23`.
fn starts_with_year(s: &str) -> bool {
    lazy_static! {
        static ref YEAR_RX: Regex = Regex::new(r"^\d{4}").unwrap();
    }
    YEAR_RX.is_match(s)
}
