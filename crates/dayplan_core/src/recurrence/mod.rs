//! Recurrence rule engine.
//!
//! # Responsibility
//! - Parse rule text into a closed set of variants.
//! - Compute the next occurrence of a rule after a reference day.
//!
//! # Invariants
//! - Rules are parsed fresh from text on every evaluation; only the text is
//!   persisted.
//! - Evaluation is a pure function, safe to call from any thread.

pub mod engine;
pub mod rule;

pub use engine::{next_date, next_occurrence, RecurrenceError, MAX_ADVANCE_STEPS};
pub use rule::{parse_rule, MonthDay, RecurrenceRule, RuleParseError, Selector, MAX_DAY_INTERVAL};
