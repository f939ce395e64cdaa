//! Task manager configuration

use crate::error::{Result, TaskError};
use crate::view::SearchScope;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";
pub const LIST_KEY_ENV: &str = "TODO_LIST_KEY";
pub const DEFAULT_LIST_KEY: &str = "todos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskManagerConfig {
    /// Directory the task lists are written to
    pub data_dir: PathBuf,

    /// Storage key of the active list
    pub list_key: String,

    /// Which views the search query narrows
    pub search_scope: SearchScope,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            list_key: DEFAULT_LIST_KEY.to_string(),
            search_scope: SearchScope::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todo"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<config dir>/todo/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todo").join("config.toml"))
}

impl TaskManagerConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing file yields the defaults. Environment overrides are applied
    /// last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let config = match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_toml_str(&contents)?
            }
            _ => Self::default(),
        };
        Ok(config.with_overrides(|name| std::env::var(name).ok()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| TaskError::Config(e.to_string()))
    }

    /// Apply `TODO_DATA_DIR` / `TODO_LIST_KEY` as resolved by `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(LIST_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.list_key = key;
        }
        self
    }
}
