use crate::error::{Error, Result};
use crate::models::{ChangeType, Entry};
use crate::storage::WorkLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net effect of a chronological range of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogDiff {
    pub from_id: Option<String>,
    pub to_id: String,
    /// The raw range, oldest first.
    pub entries: Vec<Entry>,
    pub total_changes: usize,
    pub files_added: Vec<String>,
    pub files_modified: Vec<String>,
    pub files_deleted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetChange {
    Added,
    Modified,
    Deleted,
}

/// Folds per-path changes, in order, into one classification per path.
///
/// A rename is a delete of the old path followed by an add of the new one.
/// Added-then-deleted cancels out; added-then-modified stays added; anything
/// else takes its last change type.
#[derive(Debug, Default)]
pub struct DiffCollapser {
    paths: BTreeMap<String, NetChange>,
}

impl DiffCollapser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_entry(&mut self, entry: &Entry) {
        for change in &entry.changes {
            match change.change_type {
                ChangeType::Added => self.added(&change.path),
                ChangeType::Modified => self.modified(&change.path),
                ChangeType::Deleted => self.deleted(&change.path),
                ChangeType::Renamed => {
                    if let Some(old) = &change.old_path {
                        self.deleted(old);
                    }
                    self.added(&change.path);
                }
            }
        }
    }

    fn added(&mut self, path: &str) {
        self.paths.insert(path.to_string(), NetChange::Added);
    }

    fn modified(&mut self, path: &str) {
        if self.paths.get(path) != Some(&NetChange::Added) {
            self.paths.insert(path.to_string(), NetChange::Modified);
        }
    }

    fn deleted(&mut self, path: &str) {
        if self.paths.get(path) == Some(&NetChange::Added) {
            self.paths.remove(path);
        } else {
            self.paths.insert(path.to_string(), NetChange::Deleted);
        }
    }

    /// Returns `(added, modified, deleted)`, each sorted by path.
    pub fn finish(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut added = Vec::new();
        let mut modified = Vec::new();
        let mut deleted = Vec::new();
        for (path, net) in self.paths {
            match net {
                NetChange::Added => added.push(path),
                NetChange::Modified => modified.push(path),
                NetChange::Deleted => deleted.push(path),
            }
        }
        (added, modified, deleted)
    }
}

impl WorkLogDiff {
    pub fn from_range(from_id: Option<String>, to_id: String, entries: Vec<Entry>) -> Self {
        let mut collapser = DiffCollapser::new();
        for entry in &entries {
            collapser.apply_entry(entry);
        }
        let (files_added, files_modified, files_deleted) = collapser.finish();

        Self {
            from_id,
            to_id,
            entries,
            total_changes: files_added.len() + files_modified.len() + files_deleted.len(),
            files_added,
            files_modified,
            files_deleted,
        }
    }
}

impl WorkLog {
    /// Diffs two points on the default branch's history. `from = None`
    /// starts at the branch root. Both endpoints are inclusive.
    ///
    /// Endpoints that exist only on another branch do not resolve here; use
    /// [`WorkLog::get_diff_on_branch`] for those.
    pub fn get_diff(&self, from: Option<&str>, to: &str) -> Result<WorkLogDiff> {
        let branch = self.default_branch().to_string();
        self.get_diff_on_branch(&branch, from, to)
    }

    /// Diffs two points on `branch`'s history.
    pub fn get_diff_on_branch(
        &self,
        branch: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<WorkLogDiff> {
        if !self.has_work_log() {
            return Err(Error::NotInitialized(self.root().to_path_buf()));
        }
        let mut history = self
            .ancestry(branch)?
            .ok_or_else(|| Error::BranchNotFound(branch.to_string()))?;
        history.reverse();

        let position = |id: &str| {
            history
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| Error::EntryNotFound(id.to_string()))
        };

        let end = position(to)?;
        let start = match from {
            Some(from) => position(from)?,
            None => 0,
        };
        if start > end {
            return Err(Error::InvalidDiffRange {
                from: from.unwrap_or_default().to_string(),
                to: to.to_string(),
            });
        }

        let range: Vec<Entry> = history.drain(start..=end).collect();
        Ok(WorkLogDiff::from_range(
            from.map(str::to_string),
            to.to_string(),
            range,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileChange, NewEntry, Operation};
    use tempfile::TempDir;

    fn new_log() -> (TempDir, WorkLog) {
        let dir = TempDir::new().unwrap();
        let log = WorkLog::open(dir.path()).unwrap();
        log.init("demo").unwrap();
        (dir, log)
    }

    fn record(log: &WorkLog, change: FileChange) -> Entry {
        log.record_entry(
            NewEntry::new(Operation::FileModify, "change", "tester").with_change(change),
        )
        .unwrap()
    }

    fn collapse(changes: Vec<FileChange>) -> (Vec<String>, Vec<String>, Vec<String>) {
        let entry = Entry {
            id: "0".repeat(12),
            parent_id: None,
            project_id: "demo".to_string(),
            timestamp: chrono::Utc::now(),
            operation: Operation::Checkpoint,
            message: String::new(),
            author: String::new(),
            changes,
            metadata: Default::default(),
            tags: Vec::new(),
        };
        let mut collapser = DiffCollapser::new();
        collapser.apply_entry(&entry);
        collapser.finish()
    }

    fn strings(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_add_then_modify_stays_added() {
        let (added, modified, deleted) =
            collapse(vec![FileChange::added("a.gd"), FileChange::modified("a.gd")]);

        assert_eq!(added, strings(&["a.gd"]));
        assert!(modified.is_empty());
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_add_then_delete_cancels() {
        let (added, modified, deleted) = collapse(vec![
            FileChange::added("t.gd"),
            FileChange::modified("t.gd"),
            FileChange::deleted("t.gd"),
        ]);

        assert!(added.is_empty() && modified.is_empty() && deleted.is_empty());
    }

    #[test]
    fn test_rename_splits_into_delete_and_add() {
        let (added, modified, deleted) = collapse(vec![FileChange::renamed("old.gd", "new.gd")]);

        assert_eq!(added, strings(&["new.gd"]));
        assert!(modified.is_empty());
        assert_eq!(deleted, strings(&["old.gd"]));
    }

    #[test]
    fn test_rename_of_freshly_added_file_collapses() {
        let (added, _, deleted) = collapse(vec![
            FileChange::added("draft.gd"),
            FileChange::renamed("draft.gd", "final.gd"),
        ]);

        assert_eq!(added, strings(&["final.gd"]));
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_last_change_wins_otherwise() {
        let (added, modified, deleted) = collapse(vec![
            FileChange::modified("m.gd"),
            FileChange::deleted("m.gd"),
            FileChange::modified("k.gd"),
            FileChange::deleted("d.gd"),
            FileChange::added("d.gd"),
        ]);

        assert_eq!(added, strings(&["d.gd"]));
        assert_eq!(modified, strings(&["k.gd"]));
        assert_eq!(deleted, strings(&["m.gd"]));
    }

    #[test]
    fn test_diff_from_beginning() {
        let (_dir, log) = new_log();
        record(&log, FileChange::added("a.gd"));
        let e2 = record(&log, FileChange::modified("a.gd"));

        let diff = log.get_diff(None, &e2.id).unwrap();
        assert_eq!(diff.files_added, strings(&["a.gd"]));
        assert!(diff.files_modified.is_empty());
        assert!(diff.files_deleted.is_empty());
        assert_eq!(diff.total_changes, 1);
        assert_eq!(diff.entries.len(), 2);
        assert!(diff.from_id.is_none());
    }

    #[test]
    fn test_diff_range_is_inclusive_and_chronological() {
        let (_dir, log) = new_log();
        record(&log, FileChange::added("a.gd"));
        let e2 = record(&log, FileChange::modified("a.gd"));
        let e3 = record(&log, FileChange::added("b.gd"));
        record(&log, FileChange::deleted("b.gd"));

        let diff = log.get_diff(Some(&e2.id), &e3.id).unwrap();
        assert_eq!(
            diff.entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec![e2.id.as_str(), e3.id.as_str()]
        );
        assert_eq!(diff.files_added, strings(&["b.gd"]));
        assert_eq!(diff.files_modified, strings(&["a.gd"]));
        assert_eq!(diff.total_changes, 2);
    }

    #[test]
    fn test_diff_unknown_endpoint() {
        let (_dir, log) = new_log();
        let e1 = record(&log, FileChange::added("a.gd"));

        assert!(matches!(
            log.get_diff(Some("abcdef012345"), &e1.id),
            Err(Error::EntryNotFound(_))
        ));
        assert!(matches!(
            log.get_diff(None, "abcdef012345"),
            Err(Error::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_diff_reversed_range() {
        let (_dir, log) = new_log();
        let e1 = record(&log, FileChange::added("a.gd"));
        let e2 = record(&log, FileChange::modified("a.gd"));

        assert!(matches!(
            log.get_diff(Some(&e2.id), &e1.id),
            Err(Error::InvalidDiffRange { .. })
        ));
    }

    #[test]
    fn test_diff_resolves_against_default_branch_only() {
        let (_dir, log) = new_log();
        record(&log, FileChange::added("a.gd"));
        log.create_branch("feature", None).unwrap();
        let side = log
            .record_entry(
                NewEntry::new(Operation::FileCreate, "side", "tester")
                    .with_change(FileChange::added("side.gd"))
                    .on_branch("feature"),
            )
            .unwrap();

        assert!(matches!(
            log.get_diff(None, &side.id),
            Err(Error::EntryNotFound(_))
        ));

        let diff = log.get_diff_on_branch("feature", None, &side.id).unwrap();
        assert_eq!(diff.files_added, strings(&["a.gd", "side.gd"]));
    }

    #[test]
    fn test_diff_on_missing_branch() {
        let (_dir, log) = new_log();
        assert!(matches!(
            log.get_diff_on_branch("ghost", None, "abcdef012345"),
            Err(Error::BranchNotFound(_))
        ));
    }
}
