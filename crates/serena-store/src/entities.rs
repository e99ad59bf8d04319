//! Typed collection helpers for Users and DailyEntries.
//!
//! Each collection is one JSON document in the key-value substrate and is
//! rewritten whole on every mutation.  There is no partial update and no
//! locking: a device has exactly one writer, and the last write wins.
//!
//! A document that fails to parse is logged and treated as an empty
//! collection, so a corrupted store self-heals instead of wedging the app.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use serena_shared::constants::{KEY_ENTRIES, KEY_USERS};
use serena_shared::{DailyEntry, User};

use crate::error::Result;
use crate::kv::KvStore;

/// Durable CRUD over the Users and DailyEntries collections.
pub struct EntityStore {
    kv: Box<dyn KvStore>,
}

impl EntityStore {
    /// Wrap an injected key-value backend.
    pub fn new(kv: impl KvStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// Direct access to the underlying key-value store (session slot,
    /// ad-hoc inspection in tests).
    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    // ------------------------------------------------------------------
    // Collection plumbing
    // ------------------------------------------------------------------

    /// Load a whole collection, recovering from corruption as empty.
    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored collection is malformed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.kv.set(key, &raw)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// All registered users, in stored order.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.load_collection(KEY_USERS)
    }

    /// Look a user up by username, compared case-insensitively.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .list_users()?
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    pub fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.list_users()?.into_iter().find(|u| u.id == id))
    }

    /// Full replace of the Users collection.  Callers read, mutate and
    /// resubmit the whole list; there is no partial update.
    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.save_collection(KEY_USERS, users)
    }

    // ------------------------------------------------------------------
    // Daily entries
    // ------------------------------------------------------------------

    /// Every entry in the store, all users mixed, in stored order.
    pub fn all_entries(&self) -> Result<Vec<DailyEntry>> {
        self.load_collection(KEY_ENTRIES)
    }

    /// Entries owned by `user_id`, most recent first.  The sort is stable,
    /// so entries sharing a timestamp keep their insertion order.
    pub fn list_entries_for_user(&self, user_id: Uuid) -> Result<Vec<DailyEntry>> {
        let mut entries: Vec<DailyEntry> = self
            .all_entries()?
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Append one entry.
    pub fn add_entry(&self, entry: &DailyEntry) -> Result<()> {
        let mut entries = self.all_entries()?;
        entries.push(entry.clone());
        self.save_collection(KEY_ENTRIES, &entries)
    }

    /// Remove an entry by id.  Returns `true` if something was deleted.
    pub fn delete_entry(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.all_entries()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save_collection(KEY_ENTRIES, &entries)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Merge-by-id reconciliation
    // ------------------------------------------------------------------

    /// Insert `user` only if no user with the same id exists.
    ///
    /// The local profile always wins on conflict: pulling remote data never
    /// overwrites a profile already present on this device.  Returns `true`
    /// if the user was inserted.
    pub fn merge_user(&self, user: &User) -> Result<bool> {
        let mut users = self.list_users()?;
        if users.iter().any(|u| u.id == user.id) {
            return Ok(false);
        }
        users.push(user.clone());
        self.save_users(&users)?;
        Ok(true)
    }

    /// Append every entry whose id is not already present locally.
    ///
    /// Existing entries are kept verbatim, including entries belonging to
    /// other users, so the merge is additive and idempotent.  Returns the
    /// number of entries added.
    pub fn merge_entries(&self, incoming: &[DailyEntry]) -> Result<usize> {
        let mut entries = self.all_entries()?;
        let known: std::collections::HashSet<Uuid> = entries.iter().map(|e| e.id).collect();

        let fresh: Vec<DailyEntry> = incoming
            .iter()
            .filter(|e| !known.contains(&e.id))
            .cloned()
            .collect();

        if fresh.is_empty() {
            return Ok(0);
        }

        let added = fresh.len();
        entries.extend(fresh);
        self.save_collection(KEY_ENTRIES, &entries)?;
        Ok(added)
    }
}
