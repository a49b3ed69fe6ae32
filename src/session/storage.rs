//! Durable key/value backends for the persisted part of the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store writes one JSON blob (`auth-storage`) on every mutation
//! and reads it once at startup. Backends only move strings; the store owns
//! the format.
//!
//! - [`MemoryStorage`]: ephemeral, shared between clones (tests, one-shot tools).
//! - [`FileStorage`]: native; one `<key>.json` file per key under a state dir.
//! - [`LocalStorage`]: browser `localStorage` (`hydrate` feature).

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Errors produced by session storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot be reached (no window, storage disabled, quota).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be mapped onto the backend safely.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String key/value persistence used by the session store.
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry, as if written by an earlier run.
    #[must_use]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        self
    }

    /// Current raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::{SessionStorage, StorageError};

    /// Stores each key as `<dir>/<key>.json`.
    ///
    /// Writes go through a temporary file and a rename so a crash never
    /// leaves a half-written session behind. Temporary names are unique per
    /// process and per write, so concurrent writers never share one. On Unix the file is created
    /// with mode `0600` since it holds a refresh token.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        #[must_use]
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        #[must_use]
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
            let valid = !key.is_empty()
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            Ok(self.dir.join(format!("{key}.json")))
        }
    }

    impl SessionStorage for FileStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            let path = self.path_for(key)?;
            match fs::read_to_string(&path) {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let path = self.path_for(key)?;
            fs::create_dir_all(&self.dir)?;
            let tmp = self.dir.join(format!(
                "{key}.json.{}.{}.tmp",
                std::process::id(),
                TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed)
            ));
            if let Err(e) = write_private(&tmp, value) {
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            fs::rename(&tmp, &path)?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            let path = self.path_for(key)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }

    static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

    fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
        let mut file = open_private(path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()
    }

    #[cfg(unix)]
    fn open_private(path: &Path) -> std::io::Result<fs::File> {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
    }

    #[cfg(not(unix))]
    fn open_private(path: &Path) -> std::io::Result<fs::File> {
        fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// Browser `localStorage`, resolved from the current window on every call.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?
            .local_storage()
            .map_err(|_| StorageError::Unavailable("localStorage access denied".to_owned()))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_owned()))
    }
}

#[cfg(feature = "hydrate")]
impl SessionStorage for LocalStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable("localStorage read failed".to_owned()))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable("localStorage write failed".to_owned()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Unavailable("localStorage remove failed".to_owned()))
    }
}
