//! Core domain logic for the dayplan task scheduler.
//! This crate is the single source of truth for task and recurrence invariants.

pub mod date;
pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use date::{format_day, parse_day, today, DateFormatError};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::task::{Task, TaskDraft, TaskId, TaskValidationError};
pub use recurrence::{
    next_date, next_occurrence, parse_rule, MonthDay, RecurrenceError, RecurrenceRule,
    RuleParseError,
};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskFilter, TaskListQuery, TaskRepository,
    TASK_LIST_LIMIT,
};
pub use service::task_service::{Completion, TaskService, TaskServiceError};
