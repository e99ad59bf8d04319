//! Device-local session slot.
//!
//! The authenticated user is cached as one JSON value under its own key.
//! Restoring a session trusts the cached record without re-validating
//! credentials; a slot that fails to parse is cleared rather than
//! surfaced, so app start never fails on a stale session.

use serena_shared::constants::KEY_SESSION;
use serena_shared::User;

use crate::entities::EntityStore;
use crate::error::Result;

impl EntityStore {
    /// Cache the authenticated user.
    pub fn save_session(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.kv().set(KEY_SESSION, &raw)
    }

    /// Read back the cached session, if one exists and parses.
    pub fn load_session(&self) -> Result<Option<User>> {
        let Some(raw) = self.kv().get(KEY_SESSION)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "session slot is malformed, clearing it");
                self.clear_session()?;
                Ok(None)
            }
        }
    }

    /// Drop the session slot.  Users and entries are untouched.
    pub fn clear_session(&self) -> Result<()> {
        self.kv().remove(KEY_SESSION)
    }
}
