//! Backup file interchange.
//!
//! An export is one JSON document holding a user and their entries; import
//! runs the same additive merge-by-id as a remote pull, just scoped to the
//! payload instead of a remote-looked-up blob.  Exporting and re-importing
//! into a fresh store reproduces the same user and entry set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use serena_shared::{DailyEntry, User};

use crate::entities::EntityStore;
use crate::error::{Result, StoreError};

/// Full backup payload for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPayload {
    pub user: User,
    pub entries: Vec<DailyEntry>,
    /// When the backup was created.
    pub exported_at: DateTime<Utc>,
}

/// What an import actually changed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ImportStats {
    /// Whether the payload's user was new to this device.
    pub user_imported: bool,
    pub entries_imported: usize,
}

impl EntityStore {
    /// Snapshot one user and their entries into a serializable payload.
    pub fn export_backup(&self, user_id: Uuid) -> Result<BackupPayload> {
        let user = self.find_user_by_id(user_id)?.ok_or(StoreError::NotFound)?;
        let entries = self.list_entries_for_user(user_id)?;

        Ok(BackupPayload {
            user,
            entries,
            exported_at: Utc::now(),
        })
    }

    /// Merge a backup payload into this store.
    ///
    /// The user is added only when no user with the same id exists, and
    /// entries merge additively by id, so importing the same file twice
    /// changes nothing the second time.
    pub fn import_backup(&self, payload: &BackupPayload) -> Result<ImportStats> {
        let user_imported = self.merge_user(&payload.user)?;
        let entries_imported = self.merge_entries(&payload.entries)?;

        tracing::info!(
            user = %payload.user.username,
            user_imported,
            entries_imported,
            "backup imported"
        );

        Ok(ImportStats {
            user_imported,
            entries_imported,
        })
    }
}
