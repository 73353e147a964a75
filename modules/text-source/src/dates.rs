//! Turns the free-form dates search engines print next to results
//! ("5 hours ago", "3 days ago", "Jan 5, 2023") into calendar dates.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use thiserror::Error;

static RE_FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static RE_MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w{3}) (\d{1,2}), (\d{4})").expect("valid regex"));

const MONTHS: [(&str, u32); 12] = [
    ("Jan", 1),
    ("Feb", 2),
    ("Mar", 3),
    ("Apr", 4),
    ("May", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Aug", 8),
    ("Sep", 9),
    ("Oct", 10),
    ("Nov", 11),
    ("Dec", 12),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("'{0}' mentions days but has no day count")]
    MissingDayCount(String),

    #[error("'{0}' has an unknown month name")]
    UnknownMonth(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),

    #[error("'{0}' cannot be converted to date")]
    Unrecognized(String),
}

/// Resolve `raw` relative to `today`. Forms are tried in order:
///
/// 1. anything containing `"hours"` is `today`. The hour count is dropped on
///    purpose: "N hours ago" is reported as today even when it crosses midnight.
/// 2. anything containing `"day"` is `today` minus the first number in it.
/// 3. `<Mon> <D>, <YYYY>`, e.g. `Jan 5, 2023`.
pub fn normalize(raw: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    if raw.contains("hours") {
        return Ok(today);
    }

    if raw.contains("day") {
        let days: u64 = RE_FIRST_NUMBER
            .find(raw)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| DateParseError::MissingDayCount(raw.to_string()))?;
        return today
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| DateParseError::InvalidDate(raw.to_string()));
    }

    if let Some(caps) = RE_MONTH_DAY_YEAR.captures(raw) {
        let month = MONTHS
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map(|(_, number)| *number)
            .ok_or_else(|| DateParseError::UnknownMonth(raw.to_string()))?;
        let day: u32 = caps[2]
            .parse()
            .map_err(|_| DateParseError::InvalidDate(raw.to_string()))?;
        let year: i32 = caps[3]
            .parse()
            .map_err(|_| DateParseError::InvalidDate(raw.to_string()))?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DateParseError::InvalidDate(raw.to_string()));
    }

    Err(DateParseError::Unrecognized(raw.to_string()))
}
