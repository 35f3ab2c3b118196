pub mod memory;
pub mod migrate;
pub mod sqlite;

pub use memory::MemoryStore;
pub use migrate::{migrate_to_current, upgrade_legacy};
pub use sqlite::SqliteStore;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

/// Storage port for the single casebook document.
///
/// `load` never fails: backend read errors are logged and degrade to
/// `None`, and both the migrator and the repository treat an empty
/// store as a fresh install. `save` errors are real data-loss risks
/// and always propagate.
pub trait CasebookStore {
    /// The stored document, or `None` on a cold store or unreadable value.
    fn load(&mut self) -> Option<Value>;

    /// Replace the stored document wholesale.
    fn save(&mut self, doc: &Value) -> Result<(), StoreError>;
}
