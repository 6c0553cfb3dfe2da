use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn list(project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;
    let branches = log.list_branches()?;
    let current = branches
        .iter()
        .max_by_key(|h| h.updated_at)
        .map(|h| h.branch.clone());

    for head in &branches {
        let marker = if current.as_deref() == Some(head.branch.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        let entry = head
            .entry_id
            .as_deref()
            .map(|id| id.yellow().to_string())
            .unwrap_or_else(|| "(empty)".dimmed().to_string());
        println!("{} {} {}", marker, head.branch.bold(), entry);
    }

    Ok(())
}

pub fn create(name: String, from: Option<String>, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;
    let head = log.create_branch(&name, from.as_deref())?;

    println!("{} {}", "✓ Created branch".green().bold(), head.branch.bold());
    println!(
        "  {}: {}",
        "Starts at".bold(),
        head.entry_id.as_deref().unwrap_or("(empty)")
    );

    Ok(())
}

pub fn delete(name: String, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;

    if log.delete_branch(&name)? {
        println!("{} {}", "✓ Deleted branch".green().bold(), name.bold());
    } else {
        println!("{} {}", "No such branch:".yellow(), name);
    }

    Ok(())
}
