//! The operation surface a UI layer calls.
//!
//! [`Portal`] owns the entity store and the sync engine and strings the
//! pieces together: logins establish the cached session, profile updates
//! refresh it, logout clears only the slot.  Everything else delegates to
//! the focused modules.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use serena_shared::{DailyEntry, Mood, User};
use serena_store::backup::{BackupPayload, ImportStats};
use serena_store::{EntityStore, StoreError};

use crate::auth::{self, NewAccount, ProfileUpdate};
use crate::error::{AuthError, ReportError, SyncError, ValidationError};
use crate::remote::RemoteStore;
use crate::report::{self, HistoryWindow, Report};
use crate::sync::SyncEngine;

pub struct Portal<R: RemoteStore> {
    store: EntityStore,
    sync: SyncEngine<R>,
}

impl<R: RemoteStore> Portal<R> {
    pub fn new(store: EntityStore, sync: SyncEngine<R>) -> Self {
        Self { store, sync }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Accounts and sessions
    // ------------------------------------------------------------------

    pub fn register(&self, account: NewAccount) -> Result<User, ValidationError> {
        auth::register(&self.store, account)
    }

    /// Authenticate and establish the device session.
    ///
    /// Supplying the CPF enables the remote recovery fallback on a local
    /// miss; without it only local accounts can log in.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        cpf_attempt: Option<&str>,
    ) -> Result<User, AuthError> {
        let user = auth::login(&self.store, &self.sync, username, password, cpf_attempt).await?;
        self.store.save_session(&user)?;
        Ok(user)
    }

    /// Re-establish the session cached on this device, if any.  The
    /// cached record is trusted as already authenticated.
    pub fn restore_session(&self) -> Result<Option<User>, StoreError> {
        self.store.load_session()
    }

    /// Clear the session slot.  Users and entries stay put.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear_session()
    }

    /// Update profile fields and refresh the cached session when it
    /// belongs to the updated account.
    pub fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, ValidationError> {
        let updated = auth::update_profile(&self.store, user_id, update)?;

        if let Some(session) = self.store.load_session()? {
            if session.id == updated.id {
                self.store.save_session(&updated)?;
            }
        }

        Ok(updated)
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Uuid>, StoreError> {
        auth::find_account_by_email(&self.store, email)
    }

    pub fn reset_password(
        &self,
        user_id: Uuid,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ValidationError> {
        auth::reset_password(&self.store, user_id, password, confirm_password)
    }

    // ------------------------------------------------------------------
    // Journaling
    // ------------------------------------------------------------------

    pub fn add_entry(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood: Mood,
        notes: &str,
    ) -> Result<DailyEntry, StoreError> {
        let entry = DailyEntry::new(user_id, date, mood, notes);
        self.store.add_entry(&entry)?;
        Ok(entry)
    }

    pub fn delete_entry(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete_entry(id)
    }

    /// Entries for a user inside the window, most recent first.
    pub fn list_recent_entries(
        &self,
        user_id: Uuid,
        window: HistoryWindow,
    ) -> Result<Vec<DailyEntry>, StoreError> {
        let entries = self.store.list_entries_for_user(user_id)?;
        Ok(report::filter_by_window(entries, window, Utc::now()))
    }

    /// Per-mood counts over the windowed history.
    pub fn mood_frequency(
        &self,
        user_id: Uuid,
        window: HistoryWindow,
    ) -> Result<Vec<(Mood, usize)>, StoreError> {
        let entries = self.list_recent_entries(user_id, window)?;
        Ok(report::mood_frequency(&entries))
    }

    // ------------------------------------------------------------------
    // Sync, reports and backups
    // ------------------------------------------------------------------

    /// Push the user's current snapshot to the remote blob store.
    pub async fn manual_sync(&self, user: &User) -> Result<(), SyncError> {
        self.sync.push(&self.store, user).await
    }

    /// Format the given (already filtered and checked) entries.  Never
    /// mutates the store.
    pub fn export_report(&self, user: &User, entries: &[DailyEntry]) -> Result<Report, ReportError> {
        report::build_report(user, entries)
    }

    pub fn export_backup(&self, user_id: Uuid) -> Result<BackupPayload, StoreError> {
        self.store.export_backup(user_id)
    }

    pub fn import_backup(&self, payload: &BackupPayload) -> Result<ImportStats, StoreError> {
        self.store.import_backup(payload)
    }
}
