//! # worklog
//!
//! Branching operation log for generated projects. This crate re-exports
//! [`worklog_core`]; the `worklog` binary lives in `worklog-cli`.

pub use worklog_core::*;
