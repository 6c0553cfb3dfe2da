use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of event an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    FileCreate,
    FileModify,
    FileDelete,
    FileRename,
    SceneCreate,
    SceneModify,
    SceneDelete,
    SceneRename,
    ScriptCreate,
    ScriptModify,
    ScriptDelete,
    ScriptRename,
    ExportStart,
    ExportComplete,
    ExportFail,
    BuildStart,
    BuildComplete,
    BuildFail,
    PluginInstall,
    PluginRemove,
    ConfigChange,
    AiGenerate,
    Checkpoint,
}

impl Operation {
    pub const ALL: [Operation; 23] = [
        Operation::FileCreate,
        Operation::FileModify,
        Operation::FileDelete,
        Operation::FileRename,
        Operation::SceneCreate,
        Operation::SceneModify,
        Operation::SceneDelete,
        Operation::SceneRename,
        Operation::ScriptCreate,
        Operation::ScriptModify,
        Operation::ScriptDelete,
        Operation::ScriptRename,
        Operation::ExportStart,
        Operation::ExportComplete,
        Operation::ExportFail,
        Operation::BuildStart,
        Operation::BuildComplete,
        Operation::BuildFail,
        Operation::PluginInstall,
        Operation::PluginRemove,
        Operation::ConfigChange,
        Operation::AiGenerate,
        Operation::Checkpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FileCreate => "file-create",
            Operation::FileModify => "file-modify",
            Operation::FileDelete => "file-delete",
            Operation::FileRename => "file-rename",
            Operation::SceneCreate => "scene-create",
            Operation::SceneModify => "scene-modify",
            Operation::SceneDelete => "scene-delete",
            Operation::SceneRename => "scene-rename",
            Operation::ScriptCreate => "script-create",
            Operation::ScriptModify => "script-modify",
            Operation::ScriptDelete => "script-delete",
            Operation::ScriptRename => "script-rename",
            Operation::ExportStart => "export-start",
            Operation::ExportComplete => "export-complete",
            Operation::ExportFail => "export-fail",
            Operation::BuildStart => "build-start",
            Operation::BuildComplete => "build-complete",
            Operation::BuildFail => "build-fail",
            Operation::PluginInstall => "plugin-install",
            Operation::PluginRemove => "plugin-remove",
            Operation::ConfigChange => "config-change",
            Operation::AiGenerate => "ai-generate",
            Operation::Checkpoint => "checkpoint",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown operation: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeType {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
            ChangeType::Renamed => "renamed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added" => Some(ChangeType::Added),
            "modified" => Some(ChangeType::Modified),
            "deleted" => Some(ChangeType::Deleted),
            "renamed" => Some(ChangeType::Renamed),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single path-level change attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_added: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_removed: Option<u64>,
}

impl FileChange {
    fn new(change_type: ChangeType, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change_type,
            old_path: None,
            content_hash: None,
            lines_added: None,
            lines_removed: None,
        }
    }

    pub fn added(path: impl Into<String>) -> Self {
        Self::new(ChangeType::Added, path)
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Self::new(ChangeType::Modified, path)
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self::new(ChangeType::Deleted, path)
    }

    pub fn renamed(old_path: impl Into<String>, path: impl Into<String>) -> Self {
        let mut change = Self::new(ChangeType::Renamed, path);
        change.old_path = Some(old_path.into());
        change
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_line_delta(mut self, added: u64, removed: u64) -> Self {
        self.lines_added = Some(added);
        self.lines_removed = Some(removed);
        self
    }

    /// Checks that `old_path` is present exactly when the change is a rename.
    pub fn validate(&self) -> crate::Result<()> {
        if self.path.is_empty() {
            return Err(crate::Error::InvalidChange("empty path".to_string()));
        }
        match (self.change_type, self.old_path.as_deref()) {
            (ChangeType::Renamed, None) | (ChangeType::Renamed, Some("")) => Err(
                crate::Error::InvalidChange(format!("rename of {} has no oldPath", self.path)),
            ),
            (ChangeType::Renamed, Some(_)) | (_, None) => Ok(()),
            (other, Some(_)) => Err(crate::Error::InvalidChange(format!(
                "{} change to {} carries an oldPath",
                other, self.path
            ))),
        }
    }
}

/// One immutable record in the log. Only `tags` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub parent_id: Option<String>,
    pub project_id: String,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub message: String,
    pub author: String,
    #[serde(default)]
    pub changes: Vec<FileChange>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Entry {
    /// Derives a fresh identifier from the entry's header plus a random nonce.
    ///
    /// Two entries with identical content still get distinct ids.
    pub fn generate_id(
        timestamp: &DateTime<Utc>,
        message: &str,
        author: &str,
        len: usize,
    ) -> String {
        use sha2::{Digest, Sha256};
        let nonce = uuid::Uuid::new_v4();
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_rfc3339().as_bytes());
        hasher.update(message.as_bytes());
        hasher.update(author.as_bytes());
        hasher.update(nonce.as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(len);
        id
    }

    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(SHORT_ID_LEN);
        &self.id[..end]
    }
}

pub const SHORT_ID_LEN: usize = 8;

/// Caller-side description of an entry to be recorded.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub operation: Operation,
    pub message: String,
    pub author: String,
    pub changes: Vec<FileChange>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub tags: Vec<String>,
    pub branch: Option<String>,
}

impl NewEntry {
    pub fn new(
        operation: Operation,
        message: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            message: message.into(),
            author: author.into(),
            changes: Vec::new(),
            metadata: BTreeMap::new(),
            tags: Vec::new(),
            branch: None,
        }
    }

    pub fn with_change(mut self, change: FileChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn with_changes(mut self, changes: impl IntoIterator<Item = FileChange>) -> Self {
        self.changes.extend(changes);
        self
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Records onto `branch` instead of the default branch.
    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Mutable pointer from a branch name to its latest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchHead {
    pub project_id: String,
    pub branch: String,
    pub entry_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BranchHead {
    pub fn new(
        project_id: impl Into<String>,
        branch: impl Into<String>,
        entry_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: project_id.into(),
            branch: branch.into(),
            entry_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn advance(&mut self, entry_id: String) {
        self.entry_id = Some(entry_id);
        self.updated_at = Utc::now();
    }
}

/// Denormalized cache of head pointers plus every entry id in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLogIndex {
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default)]
    pub branches: std::collections::BTreeMap<String, Option<String>>,
}
