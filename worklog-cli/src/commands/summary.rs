use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::display;

pub fn run(json: bool, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;
    let Some(summary) = log.get_summary()? else {
        anyhow::bail!("No work log found. Run 'worklog init' first.");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Work Log Summary".bold().cyan());
    println!("  {}: {}", "Project".bold(), summary.project_id);
    println!("  {}: {}", "Entries".bold(), summary.total_entries);
    println!("  {}: {}", "Branches".bold(), summary.branches.join(", "));
    println!("  {}: {}", "Current".bold(), summary.current_branch.green());
    println!(
        "  {}: {}",
        "Head".bold(),
        summary.head_entry_id.as_deref().unwrap_or("(empty)")
    );

    if let (Some(first), Some(last)) = (&summary.first_entry, &summary.last_entry) {
        println!();
        println!("  {}: {}", "First".bold(), display::entry_oneline(first));
        println!("  {}: {}", "Last".bold(), display::entry_oneline(last));
    }

    if !summary.operation_counts.is_empty() {
        println!();
        println!("{}", "Operations".bold());
        for (operation, count) in &summary.operation_counts {
            println!("  {:<18} {}", operation.as_str(), count.to_string().cyan());
        }
    }

    Ok(())
}
