use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (e.g. creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// A lookup expected exactly one record but found none.
    #[error("Record not found")]
    NotFound,

    /// Failed to serialize a collection before writing it out.
    ///
    /// Note the asymmetry: *de*serialization failures are recovered as an
    /// empty collection, but a write that cannot be serialized must fail.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A shared in-memory store lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
