//! # serena-client
//!
//! Client-side core of the Serena journaling portal: the sync engine that
//! mirrors a user's data into an encrypted remote blob, the auth gate
//! that resolves logins locally with a remote recovery fallback, and the
//! report exporter.  The [`Portal`] facade ties these together into the
//! operation surface a UI layer calls.

pub mod auth;
pub mod portal;
pub mod remote;
pub mod report;
pub mod sync;

mod error;

pub use error::{AuthError, ReportError, SyncError, ValidationError};
pub use portal::Portal;
pub use remote::{DirRemote, MemoryRemote, RemoteStore};
pub use sync::SyncEngine;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging for a host application embedding this crate.
///
/// Honours `RUST_LOG` when set and falls back to a sensible default
/// otherwise.  Call once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("serena_client=debug,serena_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
