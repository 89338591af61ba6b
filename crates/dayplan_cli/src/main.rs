//! `dayplan` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the store.
//! - Run exactly one API call per invocation and print its result.
//!
//! # Invariants
//! - Results go to stdout as JSON (plain text for `next-date`).
//! - Failures go to stderr as `{"error": "..."}` with a non-zero exit code.
//! - Without `--log-dir`, logging shares stderr at `error` level, so a failed
//!   run normally prints only the error body there.

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Command, Config, TaskArgs};
use dayplan_api::{next_date, TaskApi, TaskPayload};
use dayplan_core::{format_day, init_logging, init_stderr_logging, logging_status, today};
use log::{debug, warn};
use serde::Serialize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!("event=cli_exit module=cli status=error");
            eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = Config::resolve(&cli)?;
    start_logging(&config)?;
    if let Some((level, target)) = logging_status() {
        debug!("event=cli_start module=cli status=ok level={level} log_target={target}");
    }
    dispatch(&config, cli.command)
}

fn start_logging(config: &Config) -> Result<()> {
    match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_stderr_logging(&config.log_level),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to initialize logging")
}

fn dispatch(config: &Config, command: Command) -> Result<String> {
    match command {
        Command::Add(task) => to_json(&open_store(config)?.add_task(payload(None, task))?),
        Command::Get { id } => to_json(&open_store(config)?.get_task(&id)?),
        Command::Edit { id, task } => {
            to_json(&open_store(config)?.update_task(payload(Some(id), task))?)
        }
        Command::Delete { id } => to_json(&open_store(config)?.delete_task(&id)?),
        Command::List { search } => to_json(&open_store(config)?.list_tasks(&search)?),
        Command::Done { id } => to_json(&open_store(config)?.mark_done(&id)?),
        Command::NextDate { now, date, repeat } => {
            let now = now.unwrap_or_else(|| format_day(today()));
            Ok(next_date(&now, &date, &repeat)?)
        }
    }
}

fn open_store(config: &Config) -> Result<TaskApi> {
    TaskApi::open(&config.db_path)
        .with_context(|| format!("failed to open task store `{}`", config.db_path.display()))
}

fn payload(id: Option<String>, task: TaskArgs) -> TaskPayload {
    TaskPayload {
        id,
        date: task.date,
        title: task.title,
        comment: task.comment,
        repeat: task.repeat,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to encode response")
}
