//! File Backend Module
//!
//! Persistent key/value adapter over a single JSON file holding the full
//! key-to-entry map. I/O and codec failures are contained at this boundary:
//! logged, then degraded to a miss on read or a no-op on write. A persistence
//! failure must never corrupt cached state or crash the caller.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::cache::{CacheBackend, CacheEntry};

// == File Backend ==
/// Durable backend storing all entries in one JSON file.
///
/// Every operation reads the file fresh and mutations rewrite it, so the
/// file is the single source of truth. A missing file is an empty store.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a file backend persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // == Load ==
    /// Reads the stored map; unreadable or undecodable files degrade to empty.
    fn load(&self) -> HashMap<String, CacheEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!("Failed to read cache file {}: {}", self.path.display(), err);
                return HashMap::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "Failed to decode cache file {}: {}",
                    self.path.display(),
                    err
                );
                HashMap::new()
            }
        }
    }

    // == Store ==
    /// Writes the map back to disk; failures are logged and swallowed.
    fn store(&self, entries: &HashMap<String, CacheEntry>) {
        let bytes = match serde_json::to_vec(entries) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "Failed to encode cache file {}: {}",
                    self.path.display(),
                    err
                );
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = fs::create_dir_all(parent) {
                    warn!(
                        "Failed to create cache directory {}: {}",
                        parent.display(),
                        err
                    );
                    return;
                }
            }
        }

        if let Err(err) = fs::write(&self.path, bytes) {
            warn!(
                "Failed to write cache file {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

impl CacheBackend for FileBackend {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.load().remove(key)
    }

    fn set(&mut self, key: &str, entry: CacheEntry) {
        let mut entries = self.load();
        entries.insert(key.to_string(), entry);
        self.store(&entries);
    }

    fn delete(&mut self, key: &str) -> bool {
        let mut entries = self.load();
        let removed = entries.remove(key).is_some();
        if removed {
            self.store(&entries);
        }
        removed
    }

    fn clear(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(
                    "Failed to remove cache file {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }

    fn size(&self) -> usize {
        self.load().len()
    }
}
