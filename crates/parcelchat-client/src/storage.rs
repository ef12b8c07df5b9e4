//! Remembers the customer's active thread across restarts.
//!
//! Values are never validated on load. A stale id is cleared by the poller the
//! first time the server answers 404 for it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use parcelchat_types::THREAD_ID_STORAGE_KEY;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

pub trait ThreadIdStore: Send + Sync {
    fn save(&self, thread_id: &str) -> Result<()>;

    /// None on first visit or after `clear`
    fn load(&self) -> Option<String>;

    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryThreadIdStore {
    value: Mutex<Option<String>>,
}

impl MemoryThreadIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_id(thread_id: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(thread_id.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ThreadIdStore for MemoryThreadIdStore {
    fn save(&self, thread_id: &str) -> Result<()> {
        *self.slot() = Some(thread_id.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Key/value JSON file, the desktop counterpart of browser local storage.
/// Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct FileThreadIdStore {
    path: PathBuf,
}

impl FileThreadIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files behave like an empty store
    fn read_map(&self) -> Map<String, Value> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(map).map_err(|e| ClientError::Storage(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| ClientError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| ClientError::Storage(e.to_string()))
    }
}

impl ThreadIdStore for FileThreadIdStore {
    fn save(&self, thread_id: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(
            THREAD_ID_STORAGE_KEY.to_string(),
            Value::String(thread_id.to_string()),
        );
        self.write_map(&map)
    }

    fn load(&self) -> Option<String> {
        self.read_map()
            .get(THREAD_ID_STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.read_map();
        if map.remove(THREAD_ID_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}
