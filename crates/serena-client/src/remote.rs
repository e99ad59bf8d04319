//! The remote blob store boundary.
//!
//! The sync engine sees the "cloud" as one string cell per username, read
//! and written through [`RemoteStore`].  There is no locking and no
//! versioning: writes are last-write-wins, exactly like the mocked
//! storage provider in the original portal.  The two implementations here
//! simulate that cloud in memory and on a shared directory; a real HTTP
//! blob API would slot in behind the same trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

/// Async key-value contract for the remote mirror.
///
/// Only `get` and `set` exist: the protocol never deletes remote blobs
/// and never enumerates them.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError>;
}

// ---------------------------------------------------------------------------
// MemoryRemote
// ---------------------------------------------------------------------------

/// In-memory mocked cloud.  Clones share the same cell map, so two
/// "devices" in one process (or one test) can sync through it.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    cells: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteStore for MemoryRemote {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        Ok(self.cells.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.cells
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DirRemote
// ---------------------------------------------------------------------------

/// Directory-backed mocked cloud, one file per key.
///
/// Pointing two processes at the same directory gives a crude but real
/// shared blob store for trying out the two-device flow.  Keys are hex
/// encoded in the file name so arbitrary usernames stay path-safe.
#[derive(Debug, Clone)]
pub struct DirRemote {
    dir: PathBuf,
}

impl DirRemote {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.blob", hex::encode(key)))
    }
}

impl RemoteStore for DirRemote {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value.as_bytes()).await?;
        Ok(())
    }
}
