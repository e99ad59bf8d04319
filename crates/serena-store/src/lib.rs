//! # serena-store
//!
//! Local durable persistence for the Serena journaling portal.
//!
//! All state lives behind a small injected [`KvStore`] get/set interface
//! (a file per key on disk in production, a hash map in tests).  The
//! [`EntityStore`] layers typed collection helpers for Users and
//! DailyEntries on top of it, persisting each collection as a single JSON
//! document that is rewritten whole on every mutation.  The store is the
//! single source of truth on a device; the remote blob mirror is handled
//! one crate up.

pub mod backup;
pub mod entities;
pub mod kv;
pub mod session;

mod error;

pub use entities::EntityStore;
pub use error::StoreError;
pub use kv::{FileKv, KvStore, MemoryKv};
