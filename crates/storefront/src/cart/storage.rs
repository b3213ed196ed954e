//! Durable key-value stores for the cart.
//!
//! One string key maps to one serialized value. `MemoryStore` backs tests and
//! short-lived sessions; `FileStore` keeps one file per key in a directory so
//! the cart survives process restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors raised by a durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key cannot be mapped to a storage location.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// A string-keyed durable store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store.
///
/// Clones share the same map, which lets a test drop a cart and build a new
/// one over the same data to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Directory-backed store: each key is a `<key>.json` file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write to a sibling file first so a crash never leaves a half-written cart.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("cart", "[]").unwrap();
        assert_eq!(other.get("cart").unwrap().as_deref(), Some("[]"));
        other.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("fashion_store_cart").unwrap(), None);

        store.set("fashion_store_cart", "[1,2]").unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("fashion_store_cart").unwrap().as_deref(),
            Some("[1,2]")
        );

        reopened.remove("fashion_store_cart").unwrap();
        reopened.remove("fashion_store_cart").unwrap();
        assert_eq!(store.get("fashion_store_cart").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }
}
