//! Task use-case service.
//!
//! # Responsibility
//! - Run the shared validation contract on create and update.
//! - Complete tasks: remove one-off tasks, reschedule recurring ones.
//!
//! # Invariants
//! - Create and update validate identically against the same clock.
//! - Completion of a recurring task moves its date strictly forward.
//! - Service layer remains storage-agnostic.

use crate::date::{format_day, today};
use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::recurrence::{next_occurrence, RecurrenceError, RuleParseError};
use crate::repo::task_repo::{RepoError, TaskListQuery, TaskRepository};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Submitted or stored task failed validation.
    Validation(TaskValidationError),
    TaskNotFound(TaskId),
    Recurrence(RecurrenceError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Recurrence(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::TaskNotFound(_) => None,
            Self::Recurrence(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RuleParseError> for TaskServiceError {
    fn from(value: RuleParseError) -> Self {
        Self::Validation(TaskValidationError::InvalidRule(value))
    }
}

impl From<RecurrenceError> for TaskServiceError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

/// Outcome of marking a task as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// One-off task was removed.
    Deleted,
    /// Recurring task now falls on this day.
    Rescheduled(NaiveDate),
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    clock: fn() -> NaiveDate,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service reading "today" from the local clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, today)
    }

    /// Creates a service with an injected clock, mainly for tests.
    pub fn with_clock(repo: R, clock: fn() -> NaiveDate) -> Self {
        Self { repo, clock }
    }

    /// The day this service validates against.
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Validates and stores a new task under a fresh id.
    pub fn create_task(&self, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let task = draft.validate(Uuid::new_v4(), self.today())?;
        self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} date={} recurring={}",
            task.id,
            format_day(task.date),
            task.is_recurring()
        );
        Ok(task)
    }

    /// Validates `draft` and replaces the task stored under `id`.
    pub fn update_task(&self, id: TaskId, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let task = draft.validate(id, self.today())?;
        self.repo.update_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_id={} date={}",
            task.id,
            format_day(task.date)
        );
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(query)?)
    }

    /// Lists tasks matching free-form search input (see `TaskFilter::from_search`).
    pub fn search_tasks(&self, search: &str) -> Result<Vec<Task>, TaskServiceError> {
        self.list_tasks(&TaskListQuery::search(search))
    }

    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Marks a task as done.
    ///
    /// # Contract
    /// - The stored task is re-validated first; invalid rows are not touched.
    /// - One-off tasks are deleted.
    /// - Recurring tasks move to the next occurrence after
    ///   `max(today, stored date)`, computed from the stored date.
    pub fn complete_task(&self, id: TaskId) -> Result<Completion, TaskServiceError> {
        let today = self.today();
        let task = self.get_task(id)?;
        if let Err(err) = task.revalidate(today) {
            warn!("event=task_complete module=service status=error task_id={id} error_code=invalid_stored_task");
            return Err(err.into());
        }

        let Some(rule) = task.recurrence()? else {
            self.repo.delete_task(id)?;
            info!("event=task_complete module=service status=ok task_id={id} outcome=deleted");
            return Ok(Completion::Deleted);
        };

        let now = today.max(task.date);
        let next = next_occurrence(now, task.date, &rule)?;
        let rescheduled = Task { date: next, ..task };
        self.repo.update_task(&rescheduled)?;
        info!(
            "event=task_complete module=service status=ok task_id={id} outcome=rescheduled date={}",
            format_day(next)
        );
        Ok(Completion::Rescheduled(next))
    }
}
