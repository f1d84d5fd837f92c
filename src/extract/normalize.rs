//! Pure normalizers turning raw matched substrings into canonical forms.
//! Nothing here returns an error: malformed input degrades to the zero
//! default or `None`.

use chrono::{NaiveDate, NaiveDateTime};

/// Clean-state DPD sentinels. Everything else in the token vocabulary is a
/// numeric days-past-due value and counts as dirty.
pub const CLEAN_STATES: [&str; 4] = ["000", "XXX", "STD", "-"];

pub fn is_clean_token(token: &str) -> bool {
    let t = token.trim().to_uppercase();
    CLEAN_STATES.contains(&t.as_str())
}

/// Strip currency glyph, thousands separators and whitespace; reject anything
/// that is not purely numeric afterwards by falling back to the canonical "0".
pub fn clean_amount(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '₹' && *c != ',' && !c.is_whitespace())
        .collect();
    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        cleaned
    } else {
        "0".to_string()
    }
}

/// Try the four supported literal date formats in priority order and
/// normalize the first hit to YYYY-MM-DD.
pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    for fmt in ["%d/%m/%Y, %H:%M", "%d-%m-%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Numeric value of a DPD token: clean sentinels are 0, anything
/// non-numeric degrades to 0.
pub fn dpd_to_number(token: &str) -> i64 {
    if is_clean_token(token) {
        return 0;
    }
    token.trim().parse::<i64>().unwrap_or(0)
}

/// Round to one decimal place, matching the report's aggregate precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
