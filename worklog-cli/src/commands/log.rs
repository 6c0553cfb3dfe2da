use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use worklog_core::LogFilter;

use crate::display;

pub fn run(
    branch: Option<String>,
    filter: LogFilter,
    oneline: bool,
    project: Option<PathBuf>,
) -> Result<()> {
    let log = super::open_log(project)?;
    let branch = branch.unwrap_or_else(|| log.default_branch().to_string());

    if log.get_branch(&branch)?.is_none() {
        anyhow::bail!("Branch not found: {}", branch);
    }

    let entries = log.get_log(Some(&branch), &filter)?;

    if entries.is_empty() {
        println!("{}", "No entries".yellow());
        return Ok(());
    }

    if oneline {
        for entry in &entries {
            println!("{}", display::entry_oneline(entry));
        }
        return Ok(());
    }

    println!("{} {}", "History of".bold().cyan(), branch.bold().cyan());
    println!();

    for entry in &entries {
        display::print_entry_full(entry);
        println!();
    }

    Ok(())
}
