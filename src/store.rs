//! Persisted key-value store
//!
//! The logging enabled flag and the current session pointer live outside the
//! engine, behind [`KeyValueStore`]. [`JsonFileStore`] keeps them in a small JSON
//! file that every process of the application shares.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{LogError, Result};

/// Key holding the "logging enabled" flag ("true" / "false")
pub const LOGGING_ENABLED_KEY: &str = "logging_enabled";

/// Key holding the id of the current log session
pub const CURRENT_SESSION_KEY: &str = "current_session_id";

/// Minimal get/set capability supplied by the host
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when unset
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, persisting it before returning
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, useful for tests and for hosts that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| LogError::Store("memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backup a corrupted store file by renaming it with a .backup extension
fn backup_corrupted_file(path: &Path) {
    let backup_path = path.with_extension("json.backup");
    if let Err(e) = std::fs::rename(path, &backup_path) {
        tracing::warn!(
            "Failed to backup corrupted store {} to {}: {}",
            path.display(),
            backup_path.display(),
            e
        );
    } else {
        tracing::info!("Corrupted store file backed up to {}", backup_path.display());
    }
}

/// JSON-file backed store
///
/// The file is re-read on every `get` so that values written by another process
/// (the coordinator minting a session, a settings toggle) are seen immediately.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };

        if content.trim().is_empty() {
            return HashMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Failed to parse store {}: {}", self.path.display(), e);
                backup_corrupted_file(&self.path);
                HashMap::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LogError::Store("store lock poisoned".to_string()))?;

        let mut values = self.load();
        values.insert(key.to_string(), value.to_string());

        let content = serde_json::to_string_pretty(&values)
            .map_err(|e| LogError::Store(format!("failed to serialize store: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
