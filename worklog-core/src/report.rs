use crate::error::Result;
use crate::models::{ChangeType, Entry, Operation};
use crate::storage::WorkLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogSummary {
    pub project_id: String,
    pub total_entries: usize,
    /// Branch names, oldest branch first.
    pub branches: Vec<String>,
    /// The branch whose head moved most recently.
    pub current_branch: String,
    pub head_entry_id: Option<String>,
    pub first_entry: Option<Entry>,
    pub last_entry: Option<Entry>,
    pub operation_counts: BTreeMap<Operation, usize>,
}

impl WorkLog {
    /// Aggregate view over every recorded entry, `None` if there is no log.
    pub fn get_summary(&self) -> Result<Option<WorkLogSummary>> {
        if !self.has_work_log() {
            return Ok(None);
        }

        let branches = self.list_branches()?;
        let index = self.read_index()?;

        let Some(current) = branches.iter().max_by_key(|h| h.updated_at) else {
            return Ok(None);
        };
        let project_id = branches
            .iter()
            .find(|h| h.branch == self.default_branch())
            .unwrap_or(current)
            .project_id
            .clone();

        let mut operation_counts = BTreeMap::new();
        let mut first_entry = None;
        let mut last_entry = None;
        for id in &index.entries {
            let Some(entry) = self.get_entry(id)? else {
                warn!("Index lists missing entry {}", id);
                continue;
            };
            *operation_counts.entry(entry.operation).or_insert(0) += 1;
            if first_entry.is_none() {
                first_entry = Some(entry.clone());
            }
            last_entry = Some(entry);
        }

        Ok(Some(WorkLogSummary {
            project_id,
            total_entries: index.entries.len(),
            current_branch: current.branch.clone(),
            head_entry_id: current.entry_id.clone(),
            branches: branches.iter().map(|h| h.branch.clone()).collect(),
            first_entry,
            last_entry,
            operation_counts,
        }))
    }
}

/// `1 file` / `<n> files` for the entry's change list.
pub fn file_count(entry: &Entry) -> String {
    match entry.changes.len() {
        1 => "1 file".to_string(),
        n => format!("{n} files"),
    }
}

/// `<short id> [<operation>] <message> (<n> files)`
pub fn format_entry_oneline(entry: &Entry) -> String {
    format!(
        "{} [{}] {} ({})",
        entry.short_id(),
        entry.operation,
        entry.message,
        file_count(entry)
    )
}

/// Multi-line rendering with header fields and one line per file change.
pub fn format_entry_full(entry: &Entry) -> String {
    let mut out = String::new();
    out.push_str(&format!("entry {}\n", entry.id));
    out.push_str(&format!("Operation: {}\n", entry.operation));
    out.push_str(&format!("Author:    {}\n", entry.author));
    out.push_str(&format!("Date:      {}\n", entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!("Parent:    {}\n", entry.parent_id.as_deref().unwrap_or("(root)")));
    if !entry.tags.is_empty() {
        out.push_str(&format!("Tags:      {}\n", entry.tags.join(", ")));
    }
    out.push('\n');
    out.push_str(&format!("    {}\n", entry.message));

    if !entry.changes.is_empty() {
        out.push('\n');
        out.push_str(&format!("    {} changed\n", file_count(entry)));
        for change in &entry.changes {
            let line = match change.change_type {
                ChangeType::Added => format!("+ {}", change.path),
                ChangeType::Deleted => format!("- {}", change.path),
                ChangeType::Modified => format!("M {}", change.path),
                ChangeType::Renamed => format!(
                    "R {} -> {}",
                    change.old_path.as_deref().unwrap_or("?"),
                    change.path
                ),
            };
            let delta = match (change.lines_added, change.lines_removed) {
                (None, None) => String::new(),
                (added, removed) => {
                    format!(" (+{} -{})", added.unwrap_or(0), removed.unwrap_or(0))
                }
            };
            out.push_str(&format!("      {line}{delta}\n"));
        }
    }

    out
}
