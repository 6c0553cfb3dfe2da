//! Configuration file support for worklog
//!
//! Reads from `<project>/worklog.toml`. Every field is optional.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

pub const CONFIG_FILE: &str = "worklog.toml";

const MIN_ID_LENGTH: usize = 8;
const MAX_ID_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkLogConfig {
    /// Branch created by `init`; can never be deleted.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Directory under the project root that holds the log. Must be a single
    /// plain path segment.
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Number of hex characters kept from the id hash.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_dir_name() -> String {
    ".worklog".to_string()
}

fn default_id_length() -> usize {
    12
}

impl Default for WorkLogConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            dir_name: default_dir_name(),
            id_length: default_id_length(),
        }
    }
}

impl WorkLogConfig {
    /// Loads `worklog.toml` from the project directory.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.validate()?;
        self.id_length = self.id_length.clamp(MIN_ID_LENGTH, MAX_ID_LENGTH);
        Ok(self)
    }

    /// Rejects a `dir_name` that would place the log at the project root or
    /// outside it.
    pub fn validate(&self) -> Result<()> {
        let mut components = Path::new(&self.dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(Error::InvalidConfig(format!(
                "dir_name must be a single directory name, got {:?}",
                self.dir_name
            ))),
        }
    }
}
