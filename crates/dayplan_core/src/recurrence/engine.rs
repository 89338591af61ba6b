//! Next-occurrence evaluation.
//!
//! # Responsibility
//! - Compute the next due day of a recurring task relative to "now".
//!
//! # Invariants
//! - Pure: no I/O, no clock access, no shared state.
//! - An anchor already after `now` is returned unchanged.
//! - Otherwise the result is strictly after `now`, except `d 1`, which
//!   short-circuits to `now` itself.
//! - Results always fit the 8-digit day token (year <= 9999).
//! - Every walk is bounded by [`MAX_ADVANCE_STEPS`].

use crate::date::{
    fits_day_token, format_day, is_leap_year, parse_day, same_year_day, DateFormatError,
};
use crate::recurrence::rule::{parse_rule, MonthDay, RecurrenceRule, RuleParseError};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard cap on candidate steps for a single selector walk.
///
/// Covers a month-by-month walk across the whole `0000..=9999` range.
/// Fixed-period walks jump straight past `now` and need only a few steps.
pub const MAX_ADVANCE_STEPS: usize = 130_000;

/// Failure while computing a next occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    InvalidRule(RuleParseError),
    InvalidDate(DateFormatError),
    /// No candidate day exists after `now` up to year 9999.
    NoOccurrence { anchor: NaiveDate, now: NaiveDate },
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRule(err) => write!(f, "{err}"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::NoOccurrence { anchor, now } => write!(
                f,
                "no occurrence after {} for anchor {} before year 10000",
                format_day(*now),
                format_day(*anchor)
            ),
        }
    }
}

impl Error for RecurrenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRule(err) => Some(err),
            Self::InvalidDate(err) => Some(err),
            Self::NoOccurrence { .. } => None,
        }
    }
}

impl From<RuleParseError> for RecurrenceError {
    fn from(value: RuleParseError) -> Self {
        Self::InvalidRule(value)
    }
}

impl From<DateFormatError> for RecurrenceError {
    fn from(value: DateFormatError) -> Self {
        Self::InvalidDate(value)
    }
}

/// Computes the next occurrence of `rule` for a task last scheduled on `anchor`.
///
/// # Contract
/// - `anchor > now` returns `anchor`.
/// - Multi-selector rules return the earliest candidate across selectors.
///
/// # Errors
/// - [`RecurrenceError::NoOccurrence`] when the next candidate would fall
///   after 9999-12-31, or when a hand-built rule selects nothing.
pub fn next_occurrence(
    now: NaiveDate,
    anchor: NaiveDate,
    rule: &RecurrenceRule,
) -> Result<NaiveDate, RecurrenceError> {
    let walk = Walk { now, anchor };
    let next = if anchor > now {
        Some(anchor)
    } else {
        match rule {
            RecurrenceRule::Yearly => walk.yearly(),
            RecurrenceRule::EveryNDays(interval) => walk.every_n_days(*interval),
            RecurrenceRule::WeeklyOn(weekdays) => {
                earliest(weekdays.iter().map(|&weekday| walk.weekly(weekday)))
            }
            RecurrenceRule::MonthlyOnDays(days) => {
                earliest(days.iter().map(|&day| walk.monthly(day)))
            }
            RecurrenceRule::MonthlyOnDaysInMonths { days, months } => {
                earliest(months.iter().flat_map(move |&month| {
                    days.iter()
                        .filter(move |day| day.can_fall_in(month))
                        .map(move |&day| walk.in_month(month, day))
                }))
            }
        }
    };

    next.filter(|&day| fits_day_token(day))
        .ok_or(RecurrenceError::NoOccurrence { anchor, now })
}

/// String-level entry point: parses `date` and `rule`, returns a day token.
///
/// An empty `rule` means the task does not repeat; `date` is returned as-is
/// after format validation.
pub fn next_date(now: NaiveDate, date: &str, rule: &str) -> Result<String, RecurrenceError> {
    let anchor = parse_day(date)?;
    match parse_rule(rule)? {
        None => Ok(format_day(anchor)),
        Some(rule) => next_occurrence(now, anchor, &rule).map(format_day),
    }
}

/// Earliest candidate; selectors that ran out of calendar are ignored.
fn earliest(candidates: impl Iterator<Item = Option<NaiveDate>>) -> Option<NaiveDate> {
    candidates.flatten().min()
}

/// First day `start + k * period` (k >= 0) that is after `now`.
fn jump_past(start: NaiveDate, now: NaiveDate, period: u32) -> Option<NaiveDate> {
    if start > now || period == 0 {
        return Some(start);
    }
    let behind = u64::try_from((now - start).num_days()).ok()?;
    let period = u64::from(period);
    let steps = behind / period + 1;
    start.checked_add_days(Days::new(steps.checked_mul(period)?))
}

#[derive(Clone, Copy)]
struct Walk {
    now: NaiveDate,
    anchor: NaiveDate,
}

impl Walk {
    /// Moves `cursor` with `step` until `resolve` yields a day after `now`.
    ///
    /// `step` must strictly advance the cursor. Cursors for which `resolve`
    /// returns `None` (a day missing from that month) are skipped. Returns
    /// `None` once candidates leave the 8-digit calendar.
    fn advance<C: Copy>(
        self,
        start: C,
        step: impl Fn(C) -> Option<C>,
        resolve: impl Fn(C) -> Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        let mut cursor = start;
        for _ in 0..MAX_ADVANCE_STEPS {
            if let Some(day) = resolve(cursor) {
                if !fits_day_token(day) {
                    return None;
                }
                if day > self.now {
                    return Some(day);
                }
            }
            cursor = step(cursor)?;
        }
        None
    }

    fn yearly(self) -> Option<NaiveDate> {
        let anchor = self.anchor;
        self.advance(
            anchor.year(),
            |year| year.checked_add(1),
            |year| yearly_candidate(anchor, year),
        )
    }

    fn every_n_days(self, interval: u32) -> Option<NaiveDate> {
        if interval == 1 && self.now > self.anchor {
            return Some(self.now);
        }
        self.every_n_days_from(self.anchor, interval)
    }

    fn weekly(self, weekday: Weekday) -> Option<NaiveDate> {
        let offset = (weekday.number_from_monday() + 7
            - self.anchor.weekday().number_from_monday())
            % 7;
        let first = self.anchor.checked_add_days(Days::new(u64::from(offset)))?;
        self.every_n_days_from(first, 7)
    }

    fn every_n_days_from(self, start: NaiveDate, period: u32) -> Option<NaiveDate> {
        let days = Days::new(u64::from(period));
        let first = jump_past(start, self.now, period)?;
        self.advance(first, |day| day.checked_add_days(days), Some)
    }

    fn monthly(self, day: MonthDay) -> Option<NaiveDate> {
        self.advance(
            (self.anchor.year(), self.anchor.month()),
            next_month,
            |(year, month)| day.resolve(year, month),
        )
    }

    fn in_month(self, month: u32, day: MonthDay) -> Option<NaiveDate> {
        self.advance(
            self.anchor.year(),
            |year| year.checked_add(1),
            |year| day.resolve(year, month),
        )
    }
}

/// The anchor's month/day in `year`; Feb 29 falls on Mar 1 in common years.
fn yearly_candidate(anchor: NaiveDate, year: i32) -> Option<NaiveDate> {
    if anchor.month() == 2 && anchor.day() == 29 && !is_leap_year(year) {
        return NaiveDate::from_ymd_opt(year, 3, 1);
    }
    same_year_day(year, anchor)
}

fn next_month((year, month): (i32, u32)) -> Option<(i32, u32)> {
    if month == 12 {
        Some((year.checked_add(1)?, 1))
    } else {
        Some((year, month + 1))
    }
}
