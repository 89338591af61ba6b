//! Task domain model.
//!
//! # Responsibility
//! - Define the stored task record and the unvalidated draft submitted by
//!   callers.
//! - Normalize drafts into tasks: default and correct dates, check rules.
//!
//! # Invariants
//! - `TaskDraft::validate` is idempotent: re-validating a validated task
//!   yields the same task.
//! - A validated task's date is never before the `today` it was validated
//!   against.

use crate::date::{format_day, parse_day, DateFormatError};
use crate::recurrence::{next_occurrence, parse_rule, RecurrenceError, RecurrenceRule, RuleParseError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
pub type TaskId = Uuid;

/// Longest accepted rule text, in characters.
pub const MAX_RULE_LEN: usize = 128;

/// Validated, storable task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Due day, serialized as `YYYYMMDD`.
    #[serde(with = "crate::date::day_serde")]
    pub date: NaiveDate,
    pub title: String,
    pub comment: String,
    /// Recurrence rule text; empty for one-off tasks.
    ///
    /// Serialized as `repeat` to match the external wire naming.
    #[serde(rename = "repeat")]
    pub rule: String,
}

impl Task {
    /// Whether completing this task reschedules it instead of removing it.
    pub fn is_recurring(&self) -> bool {
        !self.rule.is_empty()
    }

    /// Parses the stored rule text.
    pub fn recurrence(&self) -> Result<Option<RecurrenceRule>, RuleParseError> {
        parse_rule(&self.rule)
    }

    /// Runs draft validation again on the stored form of this task.
    pub fn revalidate(&self, today: NaiveDate) -> Result<Task, TaskValidationError> {
        TaskDraft::from(self).validate(self.id, today)
    }
}

/// Task submission as received from callers, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskDraft {
    /// `YYYYMMDD`, or empty for "today".
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(rename = "repeat", default)]
    pub rule: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    /// Validates this draft into a task identified by `id`.
    ///
    /// # Contract
    /// - Blank title is rejected.
    /// - Empty date defaults to `today`.
    /// - A date before `today` snaps to `today` for one-off tasks, or to the
    ///   rule's next occurrence after `today` for recurring ones.
    /// - Rule text is parsed even when no date correction is needed.
    ///
    /// # Errors
    /// - [`TaskValidationError`] describing the first failed check.
    pub fn validate(self, id: TaskId, today: NaiveDate) -> Result<Task, TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        let date = if self.date.is_empty() {
            today
        } else {
            parse_day(&self.date)?
        };

        let rule_len = self.rule.chars().count();
        if rule_len > MAX_RULE_LEN {
            return Err(TaskValidationError::RuleTooLong { len: rule_len });
        }
        let rule = parse_rule(&self.rule)?;

        let date = match (&rule, date < today) {
            (_, false) => date,
            (None, true) => today,
            (Some(rule), true) => next_occurrence(today, date, rule)?,
        };

        Ok(Task {
            id,
            date,
            title: self.title,
            comment: self.comment,
            rule: self.rule,
        })
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            date: format_day(task.date),
            title: task.title.clone(),
            comment: task.comment.clone(),
            rule: task.rule.clone(),
        }
    }
}

/// Task submission rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    InvalidDate(DateFormatError),
    InvalidRule(RuleParseError),
    RuleTooLong { len: usize },
    /// Date correction could not find an occurrence.
    Recurrence(RecurrenceError),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::InvalidRule(err) => write!(f, "{err}"),
            Self::RuleTooLong { len } => write!(
                f,
                "rule is {len} characters long; at most {MAX_RULE_LEN} are allowed"
            ),
            Self::Recurrence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            Self::InvalidRule(err) => Some(err),
            Self::Recurrence(err) => Some(err),
            Self::EmptyTitle | Self::RuleTooLong { .. } => None,
        }
    }
}

impl From<DateFormatError> for TaskValidationError {
    fn from(value: DateFormatError) -> Self {
        Self::InvalidDate(value)
    }
}

impl From<RuleParseError> for TaskValidationError {
    fn from(value: RuleParseError) -> Self {
        Self::InvalidRule(value)
    }
}

impl From<RecurrenceError> for TaskValidationError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}
