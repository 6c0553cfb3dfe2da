use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::PathBuf;
use worklog_core::WorkLog;

pub fn run(yes: bool, project: Option<PathBuf>) -> Result<()> {
    let project_dir = super::get_project_dir(project)?;
    let log = WorkLog::open(&project_dir)?;

    if !log.has_work_log() {
        println!("{}", "No work log to destroy".yellow());
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete {} and all its history?",
                log.root().display()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    if log.destroy()? {
        println!("{}", "✓ Work log destroyed".green().bold());
    }

    Ok(())
}
