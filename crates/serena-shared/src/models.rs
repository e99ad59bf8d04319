//! Domain model structs persisted in the local entity store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be written
//! to the key-value substrate as JSON and handed directly to a UI layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered patient account.
///
/// `username`, `email` and `cpf` are unique across all users; the checks
/// live in the auth gate, not in the store.  The password is held in
/// plaintext because it doubles as key material for the sync snapshot and
/// must be reconstructible on a second device from credentials alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Primary key, generated at registration, immutable.
    pub id: Uuid,
    /// Login name, also the remote blob lookup key (compared case-insensitively).
    pub username: String,
    /// Plaintext password; empty in snapshots pushed to the remote store.
    pub password: String,
    pub full_name: String,
    pub email: String,
    /// Brazilian tax id, accepted formatted (`000.000.000-00`) or as bare digits.
    pub cpf: String,
    pub birth_date: NaiveDate,
}

impl User {
    /// Copy of this user with the password blanked, for remote snapshots.
    pub fn redacted(&self) -> Self {
        Self {
            password: String::new(),
            ..self.clone()
        }
    }
}

/// Strip a CPF down to its digits so that `123.456.789-00` and
/// `12345678900` compare (and derive keys) identically.
pub fn cpf_digits(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ---------------------------------------------------------------------------
// DailyEntry
// ---------------------------------------------------------------------------

/// A single journal entry.  Entries are created and deleted, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyEntry {
    /// Unique entry identifier; the merge-by-id reconciliation keys on this.
    pub id: Uuid,
    /// Owning user.  Entries are only ever visible to their owner.
    pub user_id: Uuid,
    /// Calendar date the entry is about (user-chosen, not necessarily today).
    pub date: NaiveDate,
    /// Creation instant, used for recency ordering and window filtering.
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    /// Free-text reflection.
    pub notes: String,
}

impl DailyEntry {
    /// Build a fresh entry for `user_id`, stamped with the current instant.
    pub fn new(user_id: Uuid, date: NaiveDate, mood: Mood, notes: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            timestamp: Utc::now(),
            mood,
            notes: notes.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Five-point mood scale, ordered worst to best.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    VeryBad,
    Bad,
    Neutral,
    Good,
    Excellent,
}

impl Mood {
    /// All moods, worst first.  Report statistics iterate this.
    pub const ALL: [Mood; 5] = [
        Mood::VeryBad,
        Mood::Bad,
        Mood::Neutral,
        Mood::Good,
        Mood::Excellent,
    ];

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::VeryBad => "Very bad",
            Mood::Bad => "Bad",
            Mood::Neutral => "Neutral",
            Mood::Good => "Good",
            Mood::Excellent => "Excellent",
        }
    }
}
