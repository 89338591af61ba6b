//! Endpoint functions over an owned store handle.
//!
//! # Responsibility
//! - Own the SQLite connection for the lifetime of the API value.
//! - Parse wire ids and days, delegate to [`TaskService`], shape responses.
//!
//! # Invariants
//! - Each call builds a fresh repository over the same connection, so a
//!   failed call leaves no half-initialized state behind.
//! - Logs carry operation names and outcomes only, never task text.

use crate::error::ApiError;
use crate::wire::{CreatedTask, Empty, TaskList, TaskPayload};
use chrono::NaiveDate;
use dayplan_core::db::{open_db, open_db_in_memory};
use dayplan_core::{parse_day, today, SqliteTaskRepository, Task, TaskId, TaskService};
use log::{debug, warn};
use rusqlite::Connection;
use std::path::Path;
use uuid::Uuid;

/// Task scheduler API bound to one store.
pub struct TaskApi {
    conn: Connection,
    clock: fn() -> NaiveDate,
}

impl TaskApi {
    /// Opens (and migrates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> Result<Self, ApiError> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn, clock: today }
    }

    /// Replaces the "today" source used for validation and completion.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Validates and stores a new task; any `id` in the payload is ignored.
    pub fn add_task(&self, payload: TaskPayload) -> Result<CreatedTask, ApiError> {
        logged("add_task", || {
            let task = self.service()?.create_task(payload.into_draft())?;
            Ok(CreatedTask {
                id: task.id.to_string(),
            })
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        logged("get_task", || {
            let id = parse_task_id(id)?;
            Ok(self.service()?.get_task(id)?)
        })
    }

    /// Replaces the task named by `payload.id`.
    pub fn update_task(&self, payload: TaskPayload) -> Result<Empty, ApiError> {
        logged("update_task", || {
            let id = parse_task_id(payload.id.as_deref().unwrap_or_default())?;
            self.service()?.update_task(id, payload.into_draft())?;
            Ok(Empty {})
        })
    }

    pub fn delete_task(&self, id: &str) -> Result<Empty, ApiError> {
        logged("delete_task", || {
            let id = parse_task_id(id)?;
            self.service()?.delete_task(id)?;
            Ok(Empty {})
        })
    }

    /// Lists up to 50 tasks by date. `search` may be blank, a `DD.MM.YYYY`
    /// day, or free text matched against title and comment.
    pub fn list_tasks(&self, search: &str) -> Result<TaskList, ApiError> {
        logged("list_tasks", || {
            let tasks = self.service()?.search_tasks(search)?;
            Ok(TaskList { tasks })
        })
    }

    /// Completes a task: one-off tasks are deleted, recurring ones advance.
    pub fn mark_done(&self, id: &str) -> Result<Empty, ApiError> {
        logged("mark_done", || {
            let id = parse_task_id(id)?;
            self.service()?.complete_task(id)?;
            Ok(Empty {})
        })
    }

    /// Same as the free [`next_date`]; the store is not touched.
    pub fn next_date(&self, now: &str, date: &str, repeat: &str) -> Result<String, ApiError> {
        next_date(now, date, repeat)
    }

    fn service(&self) -> Result<TaskService<SqliteTaskRepository<'_>>, ApiError> {
        let repo = SqliteTaskRepository::try_new(&self.conn)?;
        Ok(TaskService::with_clock(repo, self.clock))
    }
}

/// Computes the next occurrence of `repeat` for a task dated `date`.
///
/// `now` and `date` are `YYYYMMDD` tokens; an empty `repeat` echoes `date`
/// back.
pub fn next_date(now: &str, date: &str, repeat: &str) -> Result<String, ApiError> {
    logged("next_date", || {
        let now =
            parse_day(now).map_err(|err| ApiError::bad_request(format!("invalid `now`: {err}")))?;
        Ok(dayplan_core::next_date(now, date, repeat)?)
    })
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("task id is required"));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| ApiError::bad_request(format!("invalid task id `{trimmed}`")))
}

fn logged<T>(
    op: &'static str,
    call: impl FnOnce() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let result = call();
    match &result {
        Ok(_) => debug!("event=api_call module=api status=ok op={op}"),
        Err(err) => warn!(
            "event=api_call module=api status=error op={op} error_code={} status_code={}",
            err.kind().as_str(),
            err.status_code()
        ),
    }
    result
}
