//! Storage backends: the synchronous string-keyed KV seam under every
//! collection store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A synchronous string-keyed key-value store.
///
/// The contract mirrors browser local storage: reads return the raw stored
/// string or nothing, writes and removals report success as a bool and never
/// panic. Implementations must swallow their own I/O errors (logging them)
/// because no caller of a collection store is prepared to handle storage
/// failure beyond a boolean.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Returns `false` on failure (e.g. quota or
    /// I/O error) instead of propagating it.
    fn set(&self, key: &str, value: &str) -> bool;

    /// Remove `key`. Removing an absent key is a success.
    fn remove(&self, key: &str) -> bool;
}

/// In-memory backend.
///
/// Used by tests and as a fallback when no data directory is available; data
/// lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        let Ok(entries) = self.entries.lock() else {
            tracing::warn!(key, "memory storage lock poisoned on read");
            return None;
        };
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            tracing::warn!(key, "memory storage lock poisoned on write");
            return false;
        };
        entries.insert(key.to_owned(), value.to_owned());
        true
    }

    fn remove(&self, key: &str) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            tracing::warn!(key, "memory storage lock poisoned on remove");
            return false;
        };
        entries.remove(key);
        true
    }
}

/// File-per-key backend under a data directory.
///
/// The durable analog of browser local storage for this client: each fixed
/// collection key maps to one file holding the serialized blob. Keys come
/// from [`super::keys`] and contain no path separators.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// The directory this backend writes under.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read storage file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            tracing::warn!(key, error = %err, "failed to create storage directory");
            return false;
        }
        match fs::write(self.path_for(key), value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to write storage file");
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to remove storage file");
                false
            }
        }
    }
}
