/// Application name
pub const APP_NAME: &str = "Serena";

/// Practice name printed in report headers
pub const PRACTICE_NAME: &str = "Serena Therapy Practice";

/// XChaCha20-Poly1305 nonce size in bytes
pub const NONCE_SIZE: usize = 24;

/// Symmetric key size in bytes (for XChaCha20-Poly1305)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Key derivation context (BLAKE3)
pub const KDF_CONTEXT_SYNC_KEY: &str = "serena-sync-key-v1";

/// Local key-value slots for the persisted collections
pub const KEY_USERS: &str = "users";
pub const KEY_ENTRIES: &str = "entries";
pub const KEY_SESSION: &str = "session";
