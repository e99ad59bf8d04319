//! Push/pull synchronization against the remote blob store.
//!
//! Push seals the user's full entry set into one encrypted blob keyed by
//! the lowercased username and overwrites whatever was there before.
//! Pull fetches the blob, derives the key from *attempted* credentials,
//! and merges additively into the local store.  A wrong password, an
//! unknown username and a tampered blob all come back as the same
//! `Ok(None)`, so the outcome leaks nothing about which it was.

use base64::prelude::{Engine, BASE64_STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use serena_shared::crypto::{self, derive_sync_key};
use serena_shared::{DailyEntry, User};
use serena_store::EntityStore;

use crate::error::SyncError;
use crate::remote::RemoteStore;

/// What gets encrypted and parked under the username cell.
///
/// The password never travels: the user record is redacted before
/// serialization, and pull restores the field from the attempted
/// credentials after a successful decrypt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    pub user: User,
    pub entries: Vec<DailyEntry>,
    pub last_sync: DateTime<Utc>,
}

/// Orchestrates push and pull over an injected [`RemoteStore`].
pub struct SyncEngine<R: RemoteStore> {
    remote: R,
}

/// Remote cell key for a username.  Lookups are case-insensitive like the
/// local ones, so the key is normalised to lowercase on both paths.
fn blob_key(username: &str) -> String {
    username.to_ascii_lowercase()
}

impl<R: RemoteStore> SyncEngine<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Encrypt-and-overwrite the remote blob from local state.
    ///
    /// Idempotent and last-write-wins.  Any failure returns an error
    /// without having touched the local store.
    pub async fn push(&self, store: &EntityStore, user: &User) -> Result<(), SyncError> {
        let entries = store.list_entries_for_user(user.id)?;
        let entry_count = entries.len();

        let payload = SyncPayload {
            user: user.redacted(),
            entries,
            last_sync: Utc::now(),
        };

        let plaintext = serde_json::to_vec(&payload)?;
        let key = derive_sync_key(&user.password, &user.cpf);
        let sealed = crypto::encrypt(&key, &plaintext).map_err(|_| SyncError::Encryption)?;

        self.remote
            .set(&blob_key(&user.username), &BASE64_STANDARD.encode(sealed))
            .await?;

        info!(user = %user.username, entries = entry_count, "pushed snapshot to remote");
        Ok(())
    }

    /// Fetch-decrypt-and-merge the remote blob into local state.
    ///
    /// Returns `Ok(None)` when there is nothing to recover: no blob under
    /// the username, or a blob the attempted credentials cannot open.  On
    /// success the returned user is the local record when one already
    /// exists (local profile wins) or the restored remote one otherwise.
    pub async fn pull(
        &self,
        store: &EntityStore,
        username: &str,
        password_attempt: &str,
        cpf_attempt: &str,
    ) -> Result<Option<User>, SyncError> {
        let Some(blob) = self.remote.get(&blob_key(username)).await? else {
            return Ok(None);
        };

        let Ok(sealed) = BASE64_STANDARD.decode(blob.trim()) else {
            debug!(username, "remote blob is not valid base64");
            return Ok(None);
        };

        let key = derive_sync_key(password_attempt, cpf_attempt);
        let Ok(plaintext) = crypto::decrypt(&key, &sealed) else {
            // Wrong credentials and corrupt blob are indistinguishable on
            // purpose; both read as "no such remote account".
            debug!(username, "remote blob did not decrypt");
            return Ok(None);
        };

        let Ok(payload) = serde_json::from_slice::<SyncPayload>(&plaintext) else {
            debug!(username, "decrypted payload is malformed");
            return Ok(None);
        };

        // Payload fully parsed; only now does the local store change.
        let mut restored = payload.user.clone();
        restored.password = password_attempt.to_owned();

        let user_added = store.merge_user(&restored)?;
        let entries_added = store.merge_entries(&payload.entries)?;

        info!(
            user = %restored.username,
            user_added,
            entries_added,
            last_sync = %payload.last_sync,
            "merged remote snapshot"
        );

        let user = store
            .find_user_by_id(payload.user.id)?
            .unwrap_or(restored);
        Ok(Some(user))
    }
}
