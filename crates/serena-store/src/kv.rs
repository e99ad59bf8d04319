//! The durable key-value substrate.
//!
//! Everything the portal persists goes through the [`KvStore`] trait:
//! whole collections, the session slot, nothing else.  Keeping the
//! interface this small means any conforming backend (local disk, browser
//! storage, an HTTP blob API) can carry the data, and tests can swap in a
//! hash map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;

use crate::error::{Result, StoreError};

/// Injected storage dependency: a string-to-string cell store.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`.  Absent keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryKv
// ---------------------------------------------------------------------------

/// In-memory backend.  Clones share the same map, which lets a test hand
/// one store to several components.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| StoreError::Poisoned)?;
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| StoreError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileKv
// ---------------------------------------------------------------------------

/// File-per-key backend rooted at a directory.
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (or create) the default application store.
    ///
    /// The directory is placed in the platform-appropriate data location:
    /// - Linux:   `~/.local/share/serena/store`
    /// - macOS:   `~/Library/Application Support/com.serena.serena/store`
    /// - Windows: `{FOLDERID_RoamingAppData}\serena\serena\data\store`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "serena", "serena").ok_or(StoreError::NoDataDir)?;

        let dir = project_dirs.data_dir().join("store");

        tracing::info!(path = %dir.display(), "opening file store");

        Self::open_at(&dir)
    }

    /// Open (or create) a store rooted at an explicit directory.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
