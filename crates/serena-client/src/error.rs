use thiserror::Error;

use serena_store::StoreError;

use crate::remote::RemoteError;

/// Registration and profile update failures.  All of these are surfaced
/// as user-visible messages and never stored.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("CPF must contain 11 digits")]
    InvalidCpf,

    #[error("Username is already in use")]
    UsernameTaken,

    #[error("E-mail is already in use")]
    EmailTaken,

    #[error("CPF is already in use")]
    CpfTaken,

    #[error("No account matches the given id")]
    UnknownAccount,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Login failures.
///
/// `InvalidCredentials` deliberately covers unknown username, wrong
/// password and failed remote recovery alike, so a caller cannot tell
/// which part was wrong.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Push or pull step failure.  Recoverable: callers may retry manually,
/// and local state is never left half-written.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Failed to encrypt sync payload")]
    Encryption,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Report generation failures.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Callers are expected to check before invoking; an empty entry set
    /// is refused rather than rendered as a blank document.
    #[error("No entries to report on")]
    NoEntries,
}
