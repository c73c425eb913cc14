//! Sort key normalisation for registration numbers.
//!
//! Court exports carry `reg_no` and `reg_year` as free text ("123",
//! " 0123", "2019", sometimes blank or "N/A"). The key produced here puts
//! registrations in filing order under a plain string comparison:
//!
//! - year first, then number, both zero-padded
//! - missing or non-numeric parts sort after every real value

const MISSING_YEAR: &str = "9999";
const MISSING_NUMBER: &str = "99999999";

/// Normalise a registration number/year pair into a sortable string.
///
/// Input: `reg_no = "123"`, `reg_year = "2019"`
/// Output: `"2019.00000123"`
pub fn registration_key(reg_no: Option<&str>, reg_year: Option<&str>) -> String {
    let year = reg_year
        .and_then(parse_digits)
        .filter(|&y| y <= 9999)
        .map(|y| format!("{y:04}"))
        .unwrap_or_else(|| MISSING_YEAR.to_string());
    let number = reg_no
        .and_then(parse_digits)
        .filter(|&n| n < 99_999_999)
        .map(|n| format!("{n:08}"))
        .unwrap_or_else(|| MISSING_NUMBER.to_string());
    format!("{year}.{number}")
}

/// Parse a registration part, tolerating surrounding whitespace and a
/// trailing `.0` left behind by spreadsheet exports.
pub fn parse_digits(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_suffix(".0").unwrap_or(s);
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
