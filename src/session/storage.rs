//! Durable client-side key/value storage.
//!
//! Mirrors what a browser's localStorage gives a web front end: string keys,
//! string values, surviving restarts. `FileStorage` keeps the whole map in a
//! single JSON file.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the serialized `{username, roles}` record.
pub const USER_KEY: &str = "user";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access storage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize storage contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Remove every key this client has written
    fn clear(&self) -> Result<(), StorageError>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().clear();
        Ok(())
    }
}

/// Storage persisted as a JSON object in one file.
///
/// The file is read lazily on every access so that two invocations of the
/// binary see each other's writes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read client storage");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Client storage is corrupt, ignoring it");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io_err)?;

        // The file holds the bearer token; `mode` above only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }

        file.write_all(content.as_bytes()).map_err(io_err)?;
        debug!(path = %self.path.display(), keys = entries.len(), "Client storage written");
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock();
        let mut entries = self.read_all();
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(USER_KEY, r#"{"username":"mira","roles":[]}"#).unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert!(reopened.get(USER_KEY).unwrap().contains("mira"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::new(&path);
        storage.set(TOKEN_KEY, "abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_storage_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileStorage::new(&path).set(TOKEN_KEY, "abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_storage_clear_removes_everything() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.clear().unwrap();

        assert!(storage.get(TOKEN_KEY).is_none());
        assert!(!storage.path().exists());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.get(USER_KEY).is_none());

        // A write replaces the corrupt content
        storage.set(TOKEN_KEY, "t").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t"));
    }

    #[test]
    fn test_memory_storage_remove() {
        let storage = MemoryStorage::with_entries([(TOKEN_KEY, "t"), (USER_KEY, "u")]);
        storage.remove(TOKEN_KEY).unwrap();
        assert!(storage.get(TOKEN_KEY).is_none());
        assert_eq!(storage.get(USER_KEY).as_deref(), Some("u"));
    }
}
