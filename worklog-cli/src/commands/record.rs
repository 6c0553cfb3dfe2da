use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use worklog_core::{FileChange, NewEntry, Operation};

pub struct RecordArgs {
    pub operation: Operation,
    pub message: String,
    pub author: String,
    pub branch: Option<String>,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<String>,
    pub tags: Vec<String>,
    pub meta: Vec<String>,
}

pub fn run(args: RecordArgs, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;

    let mut new = NewEntry::new(args.operation, args.message, args.author)
        .with_changes(args.added.into_iter().map(FileChange::added))
        .with_changes(args.modified.into_iter().map(FileChange::modified))
        .with_changes(args.deleted.into_iter().map(FileChange::deleted))
        .with_tags(args.tags);

    for pair in &args.renamed {
        let (old, new_path) = split_pair(pair).context("Rename must be given as OLD=NEW")?;
        new = new.with_change(FileChange::renamed(old, new_path));
    }

    for pair in &args.meta {
        let (key, raw) = split_pair(pair).context("Metadata must be given as KEY=VALUE")?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        new = new.with_metadata(key, value);
    }

    if let Some(branch) = args.branch {
        new = new.on_branch(branch);
    }

    let entry = log.record_entry(new)?;

    println!("{}", "✓ Entry recorded".green().bold());
    println!("  {}: {}", "Entry ID".bold(), entry.id);
    println!("  {}: {}", "Operation".bold(), entry.operation);
    println!(
        "  {}: {}",
        "Parent".bold(),
        entry.parent_id.as_deref().unwrap_or("(root)")
    );
    println!("  {}: {}", "Files changed".bold(), entry.changes.len());

    Ok(())
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    pair.split_once('=')
        .filter(|(left, right)| !left.is_empty() && !right.is_empty())
}
