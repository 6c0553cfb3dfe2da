use crate::config::WorkLogConfig;
use crate::error::{Error, Result};
use crate::models::{BranchHead, Entry, NewEntry, WorkLogIndex};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADS_FILE: &str = "heads.json";
const INDEX_FILE: &str = "index.json";
const ENTRIES_DIR: &str = "entries";

pub type HeadTable = BTreeMap<String, BranchHead>;

/// File-backed operation log for one project directory.
///
/// ```text
/// <project>/.worklog/
///   heads.json
///   index.json
///   entries/<entryId>.json
/// ```
///
/// Assumes a single writer per project directory. Every mutation is a
/// read-modify-write of whole files with no locking, so two concurrent
/// writers can lose each other's head/index updates.
#[derive(Debug, Clone)]
pub struct WorkLog {
    project_dir: PathBuf,
    root: PathBuf,
    config: WorkLogConfig,
}

impl WorkLog {
    /// Opens the log for `project_dir`, reading `worklog.toml` if present.
    /// Nothing is created on disk until [`WorkLog::init`].
    pub fn open<P: AsRef<Path>>(project_dir: P) -> Result<Self> {
        let config = WorkLogConfig::load(project_dir.as_ref())?;
        Self::with_config(project_dir, config)
    }

    /// Fails with `InvalidConfig` if `config.dir_name` does not name a
    /// directory strictly inside `project_dir`.
    pub fn with_config<P: AsRef<Path>>(project_dir: P, config: WorkLogConfig) -> Result<Self> {
        config.validate()?;
        let project_dir = project_dir.as_ref().to_path_buf();
        let root = project_dir.join(&config.dir_name);
        Ok(Self {
            project_dir,
            root,
            config,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkLogConfig {
        &self.config
    }

    pub fn default_branch(&self) -> &str {
        &self.config.default_branch
    }

    pub fn has_work_log(&self) -> bool {
        self.heads_path().is_file()
    }

    /// Creates the log with an empty default branch.
    /// Returns `false` without touching anything if a log already exists.
    pub fn init(&self, project_id: &str) -> Result<bool> {
        if self.has_work_log() {
            debug!("Work log already exists at {:?}", self.root);
            return Ok(false);
        }

        fs::create_dir_all(self.entries_dir())?;

        let branch = self.default_branch().to_string();
        let mut index = WorkLogIndex::default();
        index.branches.insert(branch.clone(), None);
        self.write_index(&index)?;

        let mut heads = HeadTable::new();
        heads.insert(branch.clone(), BranchHead::new(project_id, branch, None));
        self.write_heads(&heads)?;

        info!("Initialized work log for {} at {:?}", project_id, self.root);
        Ok(true)
    }

    /// Irreversibly removes the log directory. The project directory itself
    /// is left alone.
    pub fn destroy(&self) -> Result<bool> {
        if !self.has_work_log() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.root)?;
        info!("Destroyed work log at {:?}", self.root);
        Ok(true)
    }

    // Entry store
    pub(crate) fn put_entry(&self, entry: &Entry) -> Result<()> {
        write_json(&self.entry_path(&entry.id), entry)
    }

    /// Loads an entry by its full id, `None` if it does not exist.
    pub fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        if !is_entry_id(id) {
            return Ok(None);
        }
        read_json_opt(&self.entry_path(id))
    }

    /// Expands a unique id prefix to the full entry id.
    pub fn resolve_entry_id(&self, prefix: &str) -> Result<String> {
        if !is_entry_id(prefix) {
            return Err(Error::EntryNotFound(prefix.to_string()));
        }
        if self.entry_path(prefix).is_file() {
            return Ok(prefix.to_string());
        }

        let index = self.read_index()?;
        let mut matches: Vec<&String> = index
            .entries
            .iter()
            .filter(|id| id.starts_with(prefix))
            .collect();
        matches.dedup();

        match matches.as_slice() {
            [] => Err(Error::EntryNotFound(prefix.to_string())),
            [id] => Ok((*id).clone()),
            _ => Err(Error::AmbiguousEntryId(prefix.to_string())),
        }
    }

    // Head table and index
    pub(crate) fn read_heads(&self) -> Result<HeadTable> {
        read_json_opt(&self.heads_path())?.ok_or_else(|| Error::NotInitialized(self.root.clone()))
    }

    fn write_heads(&self, heads: &HeadTable) -> Result<()> {
        write_json(&self.heads_path(), heads)
    }

    pub(crate) fn read_index(&self) -> Result<WorkLogIndex> {
        read_json_opt(&self.index_path())?.ok_or_else(|| Error::NotInitialized(self.root.clone()))
    }

    fn write_index(&self, index: &WorkLogIndex) -> Result<()> {
        write_json(&self.index_path(), index)
    }

    pub fn get_branch(&self, name: &str) -> Result<Option<BranchHead>> {
        if !self.has_work_log() {
            return Ok(None);
        }
        Ok(self.read_heads()?.remove(name))
    }

    /// All branch heads, oldest branch first.
    pub fn list_branches(&self) -> Result<Vec<BranchHead>> {
        if !self.has_work_log() {
            return Ok(Vec::new());
        }
        let mut branches: Vec<BranchHead> = self.read_heads()?.into_values().collect();
        branches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(branches)
    }

    /// Forks `name` off the current head of `from` (the default branch when
    /// `None`). The new branch shares all history up to that head.
    pub fn create_branch(&self, name: &str, from: Option<&str>) -> Result<BranchHead> {
        validate_branch_name(name)?;
        let from = from.unwrap_or(self.default_branch());

        let mut heads = self.read_heads()?;
        if heads.contains_key(name) {
            return Err(Error::BranchExists(name.to_string()));
        }
        let source = heads
            .get(from)
            .ok_or_else(|| Error::SourceBranchMissing(from.to_string()))?;

        let head = BranchHead::new(source.project_id.clone(), name, source.entry_id.clone());

        let mut index = self.read_index()?;
        index.branches.insert(name.to_string(), head.entry_id.clone());
        self.write_index(&index)?;

        heads.insert(name.to_string(), head.clone());
        self.write_heads(&heads)?;

        info!("Created branch {} from {} at {:?}", name, from, head.entry_id);
        Ok(head)
    }

    /// Removes a branch head. Entries it pointed to stay in the store.
    pub fn delete_branch(&self, name: &str) -> Result<bool> {
        if name == self.default_branch() {
            return Err(Error::CannotDeleteDefaultBranch(name.to_string()));
        }

        let mut heads = self.read_heads()?;
        if heads.remove(name).is_none() {
            return Ok(false);
        }

        let mut index = self.read_index()?;
        index.branches.remove(name);
        self.write_index(&index)?;
        self.write_heads(&heads)?;

        info!("Deleted branch {}", name);
        Ok(true)
    }

    /// Appends a new entry to the target branch and advances that branch's
    /// head. No other branch is touched.
    pub fn record_entry(&self, new: NewEntry) -> Result<Entry> {
        let branch = new
            .branch
            .clone()
            .unwrap_or_else(|| self.default_branch().to_string());

        let mut heads = self.read_heads()?;
        let head = heads
            .get_mut(&branch)
            .ok_or_else(|| Error::BranchNotFound(branch.clone()))?;

        for change in &new.changes {
            change.validate()?;
        }

        let parent_id = head.entry_id.clone();

        // Never older than the parent, so newest-first order survives clock skew.
        let mut timestamp = Utc::now();
        let parent = match parent_id.as_deref() {
            Some(id) => self.get_entry(id)?,
            None => None,
        };
        if let Some(parent) = parent {
            timestamp = timestamp.max(parent.timestamp);
        }

        let mut tags: Vec<String> = Vec::with_capacity(new.tags.len());
        for tag in new.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let entry = Entry {
            id: Entry::generate_id(&timestamp, &new.message, &new.author, self.config.id_length),
            parent_id,
            project_id: head.project_id.clone(),
            timestamp,
            operation: new.operation,
            message: new.message,
            author: new.author,
            changes: new.changes,
            metadata: new.metadata,
            tags,
        };

        self.put_entry(&entry)?;

        let mut index = self.read_index()?;
        index.entries.push(entry.id.clone());
        index.branches.insert(branch.clone(), Some(entry.id.clone()));
        self.write_index(&index)?;

        head.advance(entry.id.clone());
        self.write_heads(&heads)?;

        debug!(
            "Recorded {} ({}) on {} with {} change(s)",
            entry.id,
            entry.operation,
            branch,
            entry.changes.len()
        );
        Ok(entry)
    }

    /// Adds `tag` to an entry. `false` if the entry is missing or already
    /// carries the tag.
    pub fn tag_entry(&self, id: &str, tag: &str) -> Result<bool> {
        let Some(mut entry) = self.get_entry(id)? else {
            return Ok(false);
        };
        if entry.tags.iter().any(|t| t == tag) {
            return Ok(false);
        }
        entry.tags.push(tag.to_string());
        self.put_entry(&entry)?;
        debug!("Tagged {} with {}", id, tag);
        Ok(true)
    }

    /// Removes `tag` from an entry. `false` if the entry is missing or does
    /// not carry the tag.
    pub fn untag_entry(&self, id: &str, tag: &str) -> Result<bool> {
        let Some(mut entry) = self.get_entry(id)? else {
            return Ok(false);
        };
        let Some(pos) = entry.tags.iter().position(|t| t == tag) else {
            return Ok(false);
        };
        entry.tags.remove(pos);
        self.put_entry(&entry)?;
        debug!("Removed tag {} from {}", tag, id);
        Ok(true)
    }

    // Helper methods
    fn heads_path(&self) -> PathBuf {
        self.root.join(HEADS_FILE)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.entries_dir().join(format!("{id}.json"))
    }
}

fn is_entry_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidBranchName(name.to_string()));
    }
    Ok(())
}

fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &serde_json::to_vec_pretty(value)?)
}

/// Writes through a sibling temp file and renames it into place so readers
/// never see a partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
