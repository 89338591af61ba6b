//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, recurrence and repository calls into
//!   use-case level APIs.
//! - Keep API/CLI layers decoupled from storage details.

pub mod task_service;
