//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths reject rows that could not have passed task validation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing is ordered by `date ASC`, then insertion order, and capped at
//!   [`TASK_LIST_LIMIT`] rows.

use crate::date::{format_day, parse_day, parse_search_day};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError, MAX_RULE_LEN};
use crate::recurrence::parse_rule;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Page size for task listing; also the maximum accepted limit.
pub const TASK_LIST_LIMIT: u32 = 50;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    date,
    title,
    comment,
    rule
FROM tasks";

const REQUIRED_TASK_COLUMNS: [&str; 7] = [
    "id",
    "date",
    "title",
    "comment",
    "rule",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    /// Connection schema version does not match this build.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row filter for task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    /// Tasks due exactly on this day.
    OnDate(NaiveDate),
    /// Case-insensitive (ASCII) substring match over title or comment.
    Text(String),
}

impl TaskFilter {
    /// Interprets free-form search box input.
    ///
    /// Blank input lists everything, `DD.MM.YYYY` filters by day, anything
    /// else is a substring search.
    pub fn from_search(search: &str) -> Self {
        let trimmed = search.trim();
        if trimmed.is_empty() {
            return Self::All;
        }
        match parse_search_day(trimmed) {
            Some(day) => Self::OnDate(day),
            None => Self::Text(trimmed.to_string()),
        }
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListQuery {
    pub filter: TaskFilter,
    /// Clamped to `1..=TASK_LIST_LIMIT`; `0` means the default page.
    pub limit: u32,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            filter: TaskFilter::All,
            limit: TASK_LIST_LIMIT,
        }
    }
}

impl TaskListQuery {
    pub fn search(search: &str) -> Self {
        Self {
            filter: TaskFilter::from_search(search),
            ..Self::default()
        }
    }
}

/// Normalizes a requested page size.
pub fn normalize_list_limit(limit: u32) -> u32 {
    match limit {
        0 => TASK_LIST_LIMIT,
        value => value.min(TASK_LIST_LIMIT),
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository borrowing an explicit connection handle.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection after checking it carries the current schema.
    ///
    /// # Errors
    /// - [`RepoError::UninitializedConnection`] when migrations were not
    ///   applied (e.g. a raw `Connection::open`).
    /// - [`RepoError::MissingRequiredTable`] / [`RepoError::MissingRequiredColumn`]
    ///   when the schema was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        ensure_storable(task)?;

        self.conn.execute(
            "INSERT INTO tasks (id, date, title, comment, rule)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.id.to_string(),
                format_day(task.date),
                task.title.as_str(),
                task.comment.as_str(),
                task.rule.as_str(),
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        ensure_storable(task)?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                date = ?1,
                title = ?2,
                comment = ?3,
                rule = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                format_day(task.date),
                task.title.as_str(),
                task.comment.as_str(),
                task.rule.as_str(),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = String::from(TASK_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        match &query.filter {
            TaskFilter::All => {}
            TaskFilter::OnDate(day) => {
                sql.push_str(" WHERE date = ?");
                bind_values.push(Value::Text(format_day(*day)));
            }
            TaskFilter::Text(text) => {
                sql.push_str(" WHERE title LIKE ? ESCAPE '\\' OR comment LIKE ? ESCAPE '\\'");
                let pattern = format!("%{}%", escape_like(text));
                bind_values.push(Value::Text(pattern.clone()));
                bind_values.push(Value::Text(pattern));
            }
        }

        sql.push_str(" ORDER BY date ASC, rowid ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(query.limit))));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Checks the date-independent part of task validation.
///
/// Date correction needs a "today" and belongs to the service layer; the
/// repository only refuses rows that no validation could have produced.
fn ensure_storable(task: &Task) -> RepoResult<()> {
    if task.title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle.into());
    }
    let rule_len = task.rule.chars().count();
    if rule_len > MAX_RULE_LEN {
        return Err(TaskValidationError::RuleTooLong { len: rule_len }.into());
    }
    parse_rule(&task.rule).map_err(TaskValidationError::from)?;
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id")))?;

    let date_text: String = row.get("date")?;
    let date = parse_day(&date_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid day `{date_text}` in tasks.date")))?;

    let title: String = row.get("title")?;
    if title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank title in tasks.title for task {id}"
        )));
    }

    let rule: String = row.get("rule")?;
    if let Err(err) = parse_rule(&rule) {
        return Err(RepoError::InvalidData(format!(
            "unparsable rule in tasks.rule for task {id}: {err}"
        )));
    }

    Ok(Task {
        id,
        date,
        title,
        comment: row.get("comment")?,
        rule,
    })
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in REQUIRED_TASK_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
