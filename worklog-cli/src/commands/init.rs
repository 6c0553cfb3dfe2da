use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use worklog_core::WorkLog;

pub fn run(project_id: Option<String>, project: Option<PathBuf>) -> Result<()> {
    let project_dir = super::get_project_dir(project)?;
    std::fs::create_dir_all(&project_dir)?;
    let log = WorkLog::open(&project_dir)?;

    let project_id = match project_id {
        Some(id) => id,
        None => std::fs::canonicalize(&project_dir)?
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string()),
    };

    if !log.init(&project_id)? {
        println!(
            "{} {}",
            "Work log already exists at".yellow(),
            log.root().display()
        );
        return Ok(());
    }

    println!("{}", "✓ Initialized work log".green().bold());
    println!("  {}: {}", "Project".bold(), project_id);
    println!("  {}: {}", "Location".bold(), log.root().display());
    println!("  {}: {}", "Branch".bold(), log.default_branch());

    Ok(())
}
