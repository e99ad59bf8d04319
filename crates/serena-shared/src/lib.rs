//! # serena-shared
//!
//! Domain models and cryptography shared by every Serena crate.
//!
//! Serena is the data core of a patient journaling portal: users record
//! daily mood entries on one device and can recover their account and
//! history on another through an encrypted snapshot parked in a remote
//! blob store.  This crate holds the types that cross crate boundaries
//! (`User`, `DailyEntry`, `Mood`) and the symmetric crypto used to seal
//! sync snapshots.

pub mod constants;
pub mod crypto;
pub mod models;

mod error;

pub use error::CryptoError;
pub use models::{DailyEntry, Mood, User};
