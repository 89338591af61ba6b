//! Use-case API for the task scheduler.
//!
//! # Responsibility
//! - Expose one function per endpoint (add, get, update, delete, list,
//!   mark done, next date) over an explicit store handle.
//! - Translate core failures into status-classified [`ApiError`]s.
//!
//! # Invariants
//! - Functions never panic; every failure is an `Err(ApiError)`.
//! - Wire payloads use the `YYYYMMDD` day token and the `repeat` field name.

pub mod api;
pub mod error;
pub mod wire;

pub use api::{next_date, TaskApi};
pub use error::{ApiError, ApiErrorKind};
pub use wire::{CreatedTask, Empty, TaskList, TaskPayload};
