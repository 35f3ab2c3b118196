use std::path::Path;

use rusqlite::{params, Connection};
use serde_json::Value;

use super::{CasebookStore, StoreError};

/// Fixed row id: the store holds exactly one document.
const SLOT: i64 = 0;

/// Durable single-slot store backed by SQLite.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at the given path. Safe to call
    /// repeatedly; an existing document is left untouched.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open an ephemeral in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=DELETE;
             CREATE TABLE IF NOT EXISTS casebook (
                 slot INTEGER PRIMARY KEY CHECK (slot = 0),
                 body TEXT NOT NULL,
                 saved_at TEXT NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }
}

impl CasebookStore for SqliteStore {
    fn load(&mut self) -> Option<Value> {
        let body: String = match self.conn.query_row(
            "SELECT body FROM casebook WHERE slot = ?1",
            params![SLOT],
            |row| row.get(0),
        ) {
            Ok(body) => body,
            Err(rusqlite::Error::QueryReturnedNoRows) => return None,
            Err(e) => {
                tracing::warn!("Casebook read failed, treating store as empty: {e}");
                return None;
            }
        };

        match serde_json::from_str(&body) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::error!("Stored casebook is not valid JSON, treating store as empty: {e}");
                None
            }
        }
    }

    fn save(&mut self, doc: &Value) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let saved_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO casebook (slot, body, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET body = excluded.body, saved_at = excluded.saved_at",
            params![SLOT, body, saved_at],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cold_store_reads_none() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let doc = json!({ "version": 3, "patients": [{ "id": "p_1_abc123", "name": "Ahmad" }] });
        store.save(&doc).unwrap();
        assert_eq!(store.load(), Some(doc));
    }

    #[test]
    fn save_replaces_previous_document() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save(&json!({ "version": 3, "notes": [] })).unwrap();
        let second = json!({ "version": 3, "notes": [{ "id": "n_1_abc123" }] });
        store.save(&second).unwrap();
        assert_eq!(store.load(), Some(second));
    }

    #[test]
    fn document_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casebook.db");
        let doc = json!({ "version": 3, "patients": [] });
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save(&doc).unwrap();
        }
        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load(), Some(doc));
    }

    #[test]
    fn repeated_open_does_not_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casebook.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save(&json!({ "version": 3 })).unwrap();
        }
        drop(SqliteStore::open(&path).unwrap());
        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load(), Some(json!({ "version": 3 })));
    }

    #[test]
    fn corrupt_body_degrades_to_none() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save(&json!({ "version": 3 })).unwrap();
        store
            .conn
            .execute("UPDATE casebook SET body = 'not json' WHERE slot = 0", [])
            .unwrap();
        assert!(store.load().is_none());
    }
}
