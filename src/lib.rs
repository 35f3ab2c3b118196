//! Offline-first local data layer for home-healthcare case management.
//!
//! The whole caseload lives in a single versioned JSON document, the
//! casebook, persisted in one SQLite slot. [`repo::Repo`] is the only
//! supported entry point: it loads the document, applies one change,
//! and writes the whole document back under a lock. Documents written
//! by older app versions are reshaped to the current schema by
//! [`store::migrate`] when the store is opened.

pub mod config;
pub mod models;
pub mod repo;
pub mod store;

pub use models::*;
pub use repo::{ImportSummary, Repo, RepoError};
pub use store::{CasebookStore, MemoryStore, SqliteStore, StoreError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding application. Call once at
/// startup; RUST_LOG overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
