pub mod branch;
pub mod destroy;
pub mod diff;
pub mod init;
pub mod log;
pub mod record;
pub mod show;
pub mod summary;
pub mod tag;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use worklog_core::WorkLog;

pub fn get_project_dir(custom_path: Option<PathBuf>) -> Result<PathBuf> {
    match custom_path {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Cannot read current directory"),
    }
}

/// Opens the log, failing if `worklog init` has not been run.
pub fn open_log(custom_path: Option<PathBuf>) -> Result<WorkLog> {
    let project_dir = get_project_dir(custom_path)?;
    let log = WorkLog::open(&project_dir)
        .with_context(|| format!("Failed to read config in {}", project_dir.display()))?;

    if !log.has_work_log() {
        anyhow::bail!(
            "No work log found in {}. Run 'worklog init' first.",
            project_dir.display()
        );
    }

    debug!("Opened work log at {:?}", log.root());
    Ok(log)
}
