//! Day-granularity date helpers.
//!
//! # Responsibility
//! - Parse and format the fixed 8-character `YYYYMMDD` day token.
//! - Provide calendar arithmetic shared by the recurrence engine.
//!
//! # Invariants
//! - `parse_day` accepts exactly 8 ASCII digits forming a real calendar day.
//! - `format_day(parse_day(x)?) == x` for every accepted token.

use chrono::{Datelike, Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// `chrono` format string for the wire day token.
pub const DAY_FORMAT: &str = "%Y%m%d";

/// Last year that fits the 8-digit day token.
pub const MAX_YEAR: i32 = 9999;

static DAY_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid day token regex"));
static SEARCH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("valid search day regex")
});

/// Date string does not match the fixed day format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatError {
    pub value: String,
}

impl Display for DateFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date `{}`: expected a calendar day as YYYYMMDD",
            self.value
        )
    }
}

impl Error for DateFormatError {}

/// Parses a `YYYYMMDD` day token.
///
/// # Errors
/// - Returns [`DateFormatError`] for anything other than 8 digits, or for
///   digit strings that do not name a real day (e.g. `20230229`).
pub fn parse_day(text: &str) -> Result<NaiveDate, DateFormatError> {
    let invalid = || DateFormatError {
        value: text.to_string(),
    };

    if !DAY_TOKEN_RE.is_match(text) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(text, DAY_FORMAT).map_err(|_| invalid())
}

/// Formats a day as the `YYYYMMDD` wire token.
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Returns the current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Recognizes the `DD.MM.YYYY` form typed into list search.
///
/// Returns `None` for any other text, including well-formed but impossible
/// days such as `31.04.2024`.
pub fn parse_search_day(text: &str) -> Option<NaiveDate> {
    let captures = SEARCH_DAY_RE.captures(text.trim())?;
    let day = captures[1].parse::<u32>().ok()?;
    let month = captures[2].parse::<u32>().ok()?;
    let year = captures[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Last calendar day of `month`, computed as "day 0 of the next month".
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// Serde adapter storing a [`NaiveDate`] as its `YYYYMMDD` token.
pub mod day_serde {
    use super::{format_day, parse_day};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_day(*day))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_day(&text).map_err(de::Error::custom)
    }
}

/// Whether `day` can be written as an 8-digit token.
pub fn fits_day_token(day: NaiveDate) -> bool {
    (0..=MAX_YEAR).contains(&day.year())
}

pub(crate) fn same_year_day(year: i32, reference: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, reference.month(), reference.day())
}
