//! Task store bootstrap: connection setup and schema migrations.
//!
//! # Responsibility
//! - Open the SQLite file (or an in-memory store) backing the task list.
//! - Bring the `tasks` schema up to the version this build understands.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No task row is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Task store failure.
#[derive(Debug)]
pub enum DbError {
    /// The store file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// A schema migration failed and was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The store was written by a newer build than this one.
    StoreTooNew {
        store_version: u32,
        supported_version: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open task store `{}`: {source}", path.display())
            }
            Self::Migration { version, source } => {
                write!(f, "task store migration {version} failed: {source}")
            }
            Self::StoreTooNew {
                store_version,
                supported_version,
            } => write!(
                f,
                "task store schema version {store_version} is newer than supported {supported_version}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::StoreTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
