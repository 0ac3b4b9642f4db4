use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::project_dirs;

const LOG_FILE_PREFIX: &str = "setlist-console.log";

/// Where the daily log files go. Falls back to the temp dir when no home
/// directory can be resolved.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("setlist-console").join("logs"))
}

/// Route `tracing` output to a daily rolling file. The terminal is owned by
/// the TUI, so nothing is written to stdout. Keep the returned guard alive
/// until exit or buffered lines are lost.
pub fn init(level: &str) -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))?;

    Ok(guard)
}
