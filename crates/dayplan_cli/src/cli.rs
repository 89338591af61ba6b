//! Command-line surface and configuration resolution.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// File name used when no store path is configured.
pub const DEFAULT_DB_FILE: &str = "scheduler.db";

/// Default level when logging shares stderr with error output.
pub const STDERR_LOG_LEVEL: &str = "error";

#[derive(Debug, Parser)]
#[command(name = "dayplan", version, about = "Personal task scheduler with recurring tasks")]
pub struct Cli {
    /// SQLite store path. Defaults to `scheduler.db` next to the executable.
    #[arg(long, global = true, env = "DAYPLAN_DBFILE", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error. Defaults to `error` on stderr, or to the
    /// build default when logging to files.
    #[arg(long, global = true, env = "DAYPLAN_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset.
    #[arg(long, global = true, env = "DAYPLAN_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task and print its id.
    Add(TaskArgs),
    /// Print one task as JSON.
    Get { id: String },
    /// Replace every field of an existing task.
    Edit {
        id: String,
        #[command(flatten)]
        task: TaskArgs,
    },
    Delete { id: String },
    /// List up to 50 tasks ordered by date.
    List {
        /// Free text, or a day as DD.MM.YYYY.
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Complete a task: one-off tasks are removed, recurring ones advance.
    Done { id: String },
    /// Print the next occurrence of a rule without touching the store.
    NextDate {
        /// Reference day as YYYYMMDD; defaults to today.
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        repeat: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,
    /// Day as YYYYMMDD; empty means today.
    #[arg(long, default_value = "")]
    pub date: String,
    #[arg(long, default_value = "")]
    pub comment: String,
    /// Recurrence rule, e.g. `d 7`, `w 1,3`, `m -1`, `m 1,15 1,6`, `y`.
    #[arg(long, default_value = "")]
    pub repeat: String,
}

/// Settings resolved from flags, environment and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => {
                let exe = std::env::current_exe().context("failed to locate executable")?;
                default_db_path(&exe)
            }
        };
        let log_dir = cli
            .log_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(str::to_string);
        let log_level = match (&cli.log_level, &log_dir) {
            (Some(level), _) => level.clone(),
            (None, Some(_)) => dayplan_core::default_log_level().to_string(),
            (None, None) => STDERR_LOG_LEVEL.to_string(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

fn default_db_path(exe: &Path) -> PathBuf {
    exe.parent()
        .map(|dir| dir.join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}
