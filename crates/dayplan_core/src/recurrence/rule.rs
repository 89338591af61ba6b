//! Recurrence rule grammar.
//!
//! # Responsibility
//! - Define the closed set of rule variants.
//! - Parse the space-separated wire form (`y`, `d 7`, `w 1,3`, `m -1`,
//!   `m 1,15 1,6`) with eager bound checks.
//!
//! # Invariants
//! - A parsed rule never carries an out-of-range selector.
//! - Every parsed rule selects at least one reachable calendar day, so
//!   evaluation always terminates.
//! - Empty text means "no recurrence" and is not a parse error.

use crate::date::days_in_month;
use chrono::{NaiveDate, Weekday};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Upper bound for `d <n>` intervals.
pub const MAX_DAY_INTERVAL: i64 = 400;

// Leap year used to decide whether a day number can ever occur in a month.
const LEAP_REFERENCE_YEAR: i32 = 2000;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Day-of-month selector. Negative wire values count from month end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthDay {
    /// Concrete day number in `1..=31`.
    Day(u32),
    /// Wire value `-1`.
    Last,
    /// Wire value `-2`.
    SecondToLast,
}

impl MonthDay {
    /// Resolves this selector inside one calendar month.
    ///
    /// Returns `None` when the month has no such day (e.g. `31` in April).
    pub fn resolve(self, year: i32, month: u32) -> Option<NaiveDate> {
        match self {
            Self::Day(day) => NaiveDate::from_ymd_opt(year, month, day),
            Self::Last => crate::date::last_day_of_month(year, month),
            Self::SecondToLast => crate::date::last_day_of_month(year, month)?.pred_opt(),
        }
    }

    /// Whether this selector can land in `month` in at least one year.
    pub fn can_fall_in(self, month: u32) -> bool {
        match self {
            Self::Day(day) => day <= days_in_month(LEAP_REFERENCE_YEAR, month),
            Self::Last | Self::SecondToLast => (1..=12).contains(&month),
        }
    }
}

/// Parsed recurrence expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// `y`: same day every year.
    Yearly,
    /// `d <n>`: every `n` days, `n` in `1..=400`.
    EveryNDays(u32),
    /// `w <list>`: on the listed weekdays.
    WeeklyOn(Vec<Weekday>),
    /// `m <days>`: on the listed days of every month.
    MonthlyOnDays(Vec<MonthDay>),
    /// `m <days> <months>`: on the listed days of the listed months only.
    MonthlyOnDaysInMonths {
        days: Vec<MonthDay>,
        months: Vec<u32>,
    },
}

/// Kind of numeric selector, used in range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    DayInterval,
    Weekday,
    MonthDay,
    Month,
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let expected = match self {
            Self::DayInterval => "day interval in 1..=400",
            Self::Weekday => "weekday in 1..=7",
            Self::MonthDay => "day of month in -2, -1, 1..=31",
            Self::Month => "month in 1..=12",
        };
        f.write_str(expected)
    }
}

/// Malformed or out-of-range recurrence rule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    /// Non-empty text without any token (whitespace only).
    EmptyTag,
    UnknownTag(String),
    WrongArity {
        tag: String,
        args: usize,
    },
    InvalidNumber(String),
    OutOfRange {
        token: String,
        selector: Selector,
    },
    /// None of the listed days exists in any of the listed months.
    Unsatisfiable {
        days: String,
        months: String,
    },
}

impl RuleParseError {
    /// Returns the rule fragment that caused the failure.
    pub fn token(&self) -> &str {
        match self {
            Self::EmptyTag => "",
            Self::UnknownTag(tag) => tag,
            Self::WrongArity { tag, .. } => tag,
            Self::InvalidNumber(token) => token,
            Self::OutOfRange { token, .. } => token,
            Self::Unsatisfiable { days, .. } => days,
        }
    }
}

impl Display for RuleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTag => write!(f, "invalid rule: missing rule tag"),
            Self::UnknownTag(tag) => write!(f, "invalid rule: unknown tag `{tag}`"),
            Self::WrongArity { tag, args } => {
                write!(f, "invalid rule: tag `{tag}` does not take {args} argument(s)")
            }
            Self::InvalidNumber(token) => write!(f, "invalid rule: `{token}` is not a number"),
            Self::OutOfRange { token, selector } => {
                write!(f, "invalid rule: `{token}` is out of range, expected {selector}")
            }
            Self::Unsatisfiable { days, months } => write!(
                f,
                "invalid rule: days `{days}` never occur in months `{months}`"
            ),
        }
    }
}

impl Error for RuleParseError {}

/// Parses rule text, treating empty text as "no recurrence".
pub fn parse_rule(text: &str) -> Result<Option<RecurrenceRule>, RuleParseError> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some)
}

impl FromStr for RecurrenceRule {
    type Err = RuleParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let tokens = text.split_whitespace().collect::<Vec<_>>();
        let Some((&tag, args)) = tokens.split_first() else {
            return Err(RuleParseError::EmptyTag);
        };

        match (tag, args) {
            ("y", []) => Ok(Self::Yearly),
            ("d", [interval]) => {
                let interval = parse_bounded(interval, Selector::DayInterval, 1, MAX_DAY_INTERVAL)?;
                Ok(Self::EveryNDays(interval as u32))
            }
            ("w", [weekdays]) => {
                let weekdays = parse_list(weekdays, |token| {
                    let number = parse_bounded(token, Selector::Weekday, 1, 7)?;
                    Ok(WEEKDAYS[(number - 1) as usize])
                })?;
                Ok(Self::WeeklyOn(weekdays))
            }
            ("m", [days]) => Ok(Self::MonthlyOnDays(parse_month_days(days)?)),
            ("m", [days_token, months_token]) => {
                let days = parse_month_days(days_token)?;
                let months = parse_list(months_token, |token| {
                    Ok(parse_bounded(token, Selector::Month, 1, 12)? as u32)
                })?;

                let reachable = months
                    .iter()
                    .any(|&month| days.iter().any(|day| day.can_fall_in(month)));
                if !reachable {
                    return Err(RuleParseError::Unsatisfiable {
                        days: (*days_token).to_string(),
                        months: (*months_token).to_string(),
                    });
                }

                Ok(Self::MonthlyOnDaysInMonths { days, months })
            }
            ("y" | "d" | "w" | "m", _) => Err(RuleParseError::WrongArity {
                tag: tag.to_string(),
                args: args.len(),
            }),
            _ => Err(RuleParseError::UnknownTag(tag.to_string())),
        }
    }
}

fn parse_month_days(token: &str) -> Result<Vec<MonthDay>, RuleParseError> {
    parse_list(token, |item| match parse_number(item)? {
        -1 => Ok(MonthDay::Last),
        -2 => Ok(MonthDay::SecondToLast),
        day @ 1..=31 => Ok(MonthDay::Day(day as u32)),
        _ => Err(RuleParseError::OutOfRange {
            token: item.to_string(),
            selector: Selector::MonthDay,
        }),
    })
}

/// Splits a comma list and parses each item, dropping duplicates.
fn parse_list<T: PartialEq>(
    token: &str,
    parse_item: impl Fn(&str) -> Result<T, RuleParseError>,
) -> Result<Vec<T>, RuleParseError> {
    let mut values = Vec::new();
    for item in token.split(',') {
        let value = parse_item(item)?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

fn parse_bounded(
    token: &str,
    selector: Selector,
    min: i64,
    max: i64,
) -> Result<i64, RuleParseError> {
    let value = parse_number(token)?;
    if !(min..=max).contains(&value) {
        return Err(RuleParseError::OutOfRange {
            token: token.to_string(),
            selector,
        });
    }
    Ok(value)
}

fn parse_number(token: &str) -> Result<i64, RuleParseError> {
    token
        .parse::<i64>()
        .map_err(|_| RuleParseError::InvalidNumber(token.to_string()))
}
