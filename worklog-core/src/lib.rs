//! # worklog-core
//!
//! Core library for worklog - a branching operation log for generated
//! projects.
//!
//! Entries record discrete changes (file edits, builds, exports, AI
//! generation) and chain to their parent. Branches are head pointers into
//! that shared history. The log lives under `<project>/.worklog/` as plain
//! JSON files.

pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod query;
pub mod report;
pub mod storage;

pub use config::WorkLogConfig;
pub use diff::{DiffCollapser, WorkLogDiff};
pub use error::{Error, Result};
pub use models::{BranchHead, ChangeType, Entry, FileChange, NewEntry, Operation, WorkLogIndex};
pub use query::LogFilter;
pub use report::{file_count, format_entry_full, format_entry_oneline, WorkLogSummary};
pub use storage::WorkLog;
