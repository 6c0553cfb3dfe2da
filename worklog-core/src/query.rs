use crate::error::Result;
use crate::models::{Entry, Operation};
use crate::storage::WorkLog;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

/// Filters for [`WorkLog::get_log`]. Every set field must match; `limit` and
/// `offset` apply last, to the newest-first result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Empty means any operation.
    pub operations: Vec<Operation>,
    pub author: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Entry matches if it carries at least one of these.
    pub tags: Vec<String>,
    /// Case-insensitive substring of the message or any changed path.
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.operations.is_empty() && !self.operations.contains(&entry.operation) {
            return false;
        }
        if self.author.as_deref().is_some_and(|a| a != entry.author) {
            return false;
        }
        if self.since.is_some_and(|since| entry.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| entry.timestamp > until) {
            return false;
        }
        if !self.tags.is_empty() && !entry.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_message = entry.message.to_lowercase().contains(&needle);
            let in_paths = entry
                .changes
                .iter()
                .any(|c| c.path.to_lowercase().contains(&needle));
            if !in_message && !in_paths {
                return false;
            }
        }
        true
    }

    fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        entries
            .into_iter()
            .filter(|e| self.matches(e))
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

impl WorkLog {
    /// Entries reachable from `branch`'s head, newest first, filtered.
    /// A missing branch or log yields an empty list.
    pub fn get_log(&self, branch: Option<&str>, filter: &LogFilter) -> Result<Vec<Entry>> {
        let branch = branch.unwrap_or(self.default_branch());
        match self.ancestry(branch)? {
            Some(entries) => Ok(filter.apply(entries)),
            None => Ok(Vec::new()),
        }
    }

    /// Walks `parentId` pointers back from the branch head. `None` when the
    /// branch does not exist.
    pub(crate) fn ancestry(&self, branch: &str) -> Result<Option<Vec<Entry>>> {
        let Some(head) = self.get_branch(branch)? else {
            return Ok(None);
        };

        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = head.entry_id;

        while let Some(id) = cursor {
            if !seen.insert(id.clone()) {
                warn!("Cycle in ancestry of {} at {}", branch, id);
                break;
            }
            let Some(entry) = self.get_entry(&id)? else {
                warn!("Dangling parent pointer on {}: {}", branch, id);
                break;
            };
            cursor = entry.parent_id.clone();
            entries.push(entry);
        }

        Ok(Some(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileChange, NewEntry};
    use tempfile::TempDir;

    fn seeded_log() -> (TempDir, WorkLog, Vec<Entry>) {
        let dir = TempDir::new().unwrap();
        let log = WorkLog::open(dir.path()).unwrap();
        log.init("demo").unwrap();

        let entries = vec![
            log.record_entry(
                NewEntry::new(Operation::FileCreate, "Add Player scene", "alice")
                    .with_change(FileChange::added("scenes/player.tscn")),
            )
            .unwrap(),
            log.record_entry(
                NewEntry::new(Operation::AiGenerate, "Generate enemy AI", "agent")
                    .with_change(FileChange::added("scripts/enemy.gd"))
                    .with_tags(["generated"]),
            )
            .unwrap(),
            log.record_entry(
                NewEntry::new(Operation::BuildComplete, "Web build", "ci").with_tags(["release"]),
            )
            .unwrap(),
            log.record_entry(
                NewEntry::new(Operation::FileModify, "Tweak speed", "alice")
                    .with_change(FileChange::modified("scripts/Player.gd")),
            )
            .unwrap(),
        ];
        (dir, log, entries)
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_log_is_newest_first() {
        let (_dir, log, recorded) = seeded_log();
        let entries = log.get_log(None, &LogFilter::new()).unwrap();

        let mut expected = ids(&recorded);
        expected.reverse();
        assert_eq!(ids(&entries), expected);
        assert!(entries.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_missing_branch_or_log_is_empty() {
        let (_dir, log, _) = seeded_log();
        assert!(log.get_log(Some("ghost"), &LogFilter::new()).unwrap().is_empty());

        let empty = TempDir::new().unwrap();
        let uninit = WorkLog::open(empty.path()).unwrap();
        assert!(uninit.get_log(None, &LogFilter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_operation_set() {
        let (_dir, log, recorded) = seeded_log();
        let filter = LogFilter::new().operations([Operation::FileCreate, Operation::FileModify]);
        let entries = log.get_log(None, &filter).unwrap();

        assert_eq!(ids(&entries), vec![recorded[3].id.as_str(), recorded[0].id.as_str()]);
    }

    #[test]
    fn test_filter_by_author_and_tags() {
        let (_dir, log, recorded) = seeded_log();

        let by_author = log.get_log(None, &LogFilter::new().author("alice")).unwrap();
        assert_eq!(by_author.len(), 2);

        let tagged = log
            .get_log(None, &LogFilter::new().tag("release").tag("generated"))
            .unwrap();
        assert_eq!(ids(&tagged), vec![recorded[2].id.as_str(), recorded[1].id.as_str()]);

        let none = log
            .get_log(None, &LogFilter::new().author("alice").tag("release"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_by_time_bounds_is_inclusive() {
        let (_dir, log, recorded) = seeded_log();
        let filter = LogFilter::new()
            .since(recorded[1].timestamp)
            .until(recorded[2].timestamp);
        let entries = log.get_log(None, &filter).unwrap();

        assert!(entries.iter().any(|e| e.id == recorded[1].id));
        assert!(entries.iter().any(|e| e.id == recorded[2].id));
        assert!(entries
            .iter()
            .all(|e| e.timestamp >= recorded[1].timestamp && e.timestamp <= recorded[2].timestamp));
    }

    #[test]
    fn test_search_matches_message_or_path() {
        let (_dir, log, recorded) = seeded_log();

        let by_message = log.get_log(None, &LogFilter::new().search("WEB BUILD")).unwrap();
        assert_eq!(ids(&by_message), vec![recorded[2].id.as_str()]);

        let by_path = log.get_log(None, &LogFilter::new().search("player")).unwrap();
        assert_eq!(ids(&by_path), vec![recorded[3].id.as_str(), recorded[0].id.as_str()]);
    }

    #[test]
    fn test_limit_and_offset_apply_after_filters() {
        let (_dir, log, recorded) = seeded_log();

        let page = log.get_log(None, &LogFilter::new().offset(1).limit(2)).unwrap();
        assert_eq!(ids(&page), vec![recorded[2].id.as_str(), recorded[1].id.as_str()]);

        let filtered_page = log
            .get_log(None, &LogFilter::new().author("alice").offset(1))
            .unwrap();
        assert_eq!(ids(&filtered_page), vec![recorded[0].id.as_str()]);

        assert!(log.get_log(None, &LogFilter::new().offset(10)).unwrap().is_empty());
    }
}
