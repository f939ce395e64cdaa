//! Task storage trait and implementations

use crate::error::{Result, TaskError};
use crate::structs::Task;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

/// Key-value persistence for task lists.
///
/// Each list is stored whole under its key; there are no partial writes.
#[async_trait]
pub trait TaskStorage: Send + Sync {
    /// Load a list. `Ok(None)` means nothing has been stored under `key`.
    async fn load_tasks(&self, key: &str) -> Result<Option<Vec<Task>>>;

    /// Replace the list stored under `key`.
    async fn save_tasks(&self, key: &str, tasks: &[Task]) -> Result<()>;

    /// Check if a list exists
    async fn tasks_exist(&self, key: &str) -> bool;

    /// Delete a list
    async fn delete_tasks(&self, key: &str) -> Result<()>;
}

/// Check that `key` names a single entry: not blank, not `.` or `..`, and
/// free of path separators, drive prefixes and NUL.
pub fn validate_list_key(key: &str) -> Result<()> {
    let invalid = key.trim().is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', ':', '\0']);
    if invalid {
        return Err(TaskError::InvalidValue(format!("invalid list key '{}'", key)));
    }
    Ok(())
}

/// File-based storage: one `<key>.json` file per list.
#[derive(Clone)]
pub struct FileTaskStorage {
    base_path: PathBuf,
}

impl FileTaskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn list_path(&self, key: &str) -> Result<PathBuf> {
        validate_list_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl TaskStorage for FileTaskStorage {
    async fn load_tasks(&self, key: &str) -> Result<Option<Vec<Task>>> {
        let path = self.list_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).await?;
        // An empty file is what an interrupted first write leaves behind
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let tasks: Vec<Task> = serde_json::from_str(&contents)?;

        Ok(Some(tasks))
    }

    async fn save_tasks(&self, key: &str, tasks: &[Task]) -> Result<()> {
        let path = self.list_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::create_dir_all(&self.base_path).await?;

        let contents = serde_json::to_string_pretty(tasks)?;

        fs::write(&tmp_path, contents).await?;
        fs::rename(&tmp_path, &path).await?;

        Ok(())
    }

    async fn tasks_exist(&self, key: &str) -> bool {
        self.list_path(key).map(|path| path.exists()).unwrap_or(false)
    }

    async fn delete_tasks(&self, key: &str) -> Result<()> {
        let path = self.list_path(key)?;

        if path.exists() {
            fs::remove_file(&path).await?;
        }

        Ok(())
    }
}

/// In-memory storage holding each list as its serialized JSON string.
///
/// Clones share the same entries, so a list saved through one handle can be
/// loaded through another.
#[derive(Clone, Default)]
pub struct MemoryTaskStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryTaskStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage that rejects every write, for exercising failure paths.
    pub fn read_only() -> Self {
        Self {
            entries: Arc::default(),
            read_only: true,
        }
    }

    /// Raw stored value for `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store a raw value, bypassing serialization.
    pub async fn insert_raw(&self, key: &str, value: String) {
        self.entries.write().await.insert(key.to_string(), value);
    }
}

#[async_trait]
impl TaskStorage for MemoryTaskStorage {
    async fn load_tasks(&self, key: &str) -> Result<Option<Vec<Task>>> {
        match self.entries.read().await.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save_tasks(&self, key: &str, tasks: &[Task]) -> Result<()> {
        if self.read_only {
            return Err(TaskError::Storage(format!("storage is read-only, cannot write '{}'", key)));
        }
        let raw = serde_json::to_string(tasks)?;
        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    async fn tasks_exist(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    async fn delete_tasks(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
