//! Hearing-date parsing and display.
//!
//! Court exports write dates day-first (`15-03-2024`, `15/03/2024`,
//! `15.03.2024`), sometimes with a trailing time. The status API answers
//! with ISO dates. Both are accepted here.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Display format used in every listing and export.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

const DAY_FIRST: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%y", "%d/%m/%y"];
const ISO: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a date written day-first, falling back to ISO.
///
/// Returns `None` for anything unparseable; a bad date never fails an import.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    parse_with(raw, DAY_FIRST, ISO)
}

/// Parse a date written ISO-first, falling back to day-first.
pub fn parse_iso_first(raw: &str) -> Option<NaiveDate> {
    parse_with(raw, ISO, DAY_FIRST)
}

/// `%Y` also accepts one or two digits; such years fall through to the `%y` forms.
const MIN_YEAR: i32 = 1000;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

fn parse_with(raw: &str, first: &[&str], second: &[&str]) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in first.iter().chain(second) {
        if let Some(d) = NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible) {
            return Some(d);
        }
    }
    for fmt in DATETIME {
        if let Some(d) = NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .and_then(|dt| plausible(dt.date()))
        {
            return Some(d);
        }
    }
    // RFC 3339 with offset, e.g. "2024-03-15T00:00:00+05:30".
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // Date followed by an arbitrary time part: retry on the first token.
    let head = s.split(|c: char| c == ' ' || c == 'T').next()?;
    if head.len() < s.len() {
        return parse_with(head, first, second);
    }
    None
}

/// Format an optional date for display; missing dates render empty.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}
