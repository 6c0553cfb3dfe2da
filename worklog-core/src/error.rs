use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No work log found at: {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Branch already exists: {0}")]
    BranchExists(String),

    #[error("Source branch does not exist: {0}")]
    SourceBranchMissing(String),

    #[error("Cannot delete the default branch: {0}")]
    CannotDeleteDefaultBranch(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Entry id prefix is ambiguous: {0}")]
    AmbiguousEntryId(String),

    #[error("Invalid branch name: {0:?}")]
    InvalidBranchName(String),

    #[error("Invalid change: {0}")]
    InvalidChange(String),

    #[error("Invalid diff range: {from} is newer than {to}")]
    InvalidDiffRange { from: String, to: String },
}
