use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(
    from: Option<String>,
    to: String,
    branch: Option<String>,
    json: bool,
    project: Option<PathBuf>,
) -> Result<()> {
    let log = super::open_log(project)?;

    let to = log.resolve_entry_id(&to)?;
    let from = from.map(|id| log.resolve_entry_id(&id)).transpose()?;

    let diff = match &branch {
        Some(branch) => log.get_diff_on_branch(branch, from.as_deref(), &to)?,
        None => log.get_diff(from.as_deref(), &to)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Diff {}..{} ({} entries)",
            diff.from_id.as_deref().unwrap_or("start"),
            diff.to_id,
            diff.entries.len()
        )
        .bold()
        .cyan()
    );
    println!("{}", "━".repeat(80).bright_black());

    if diff.total_changes == 0 {
        println!("{}", "No net changes".green());
        return Ok(());
    }

    for path in &diff.files_added {
        println!("  {} {}", "+".green(), path);
    }
    for path in &diff.files_modified {
        println!("  {} {}", "M".yellow(), path);
    }
    for path in &diff.files_deleted {
        println!("  {} {}", "-".red(), path);
    }

    println!();
    println!(
        "{} file(s) changed: {} added, {} modified, {} deleted",
        diff.total_changes.to_string().cyan(),
        diff.files_added.len(),
        diff.files_modified.len(),
        diff.files_deleted.len()
    );

    Ok(())
}
