//! Domain model for scheduled tasks.
//!
//! # Responsibility
//! - Define the canonical task record and its submission form.
//! - Own the validation contract shared by create, update and completion.
//!
//! # Invariants
//! - Every persisted task has a valid calendar day and a non-blank title.
//! - A non-empty `rule` always parses under the recurrence grammar.

pub mod task;
