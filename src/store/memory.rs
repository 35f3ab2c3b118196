use serde_json::Value;

use super::{CasebookStore, StoreError};

/// In-memory store: the unit-test double, also usable for ephemeral
/// embedding where nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Option<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { doc: None }
    }
}

impl CasebookStore for MemoryStore {
    fn load(&mut self) -> Option<Value> {
        self.doc.clone()
    }

    fn save(&mut self, doc: &Value) -> Result<(), StoreError> {
        self.doc = Some(doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_empty() {
        let mut store = MemoryStore::new();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let doc = json!({ "version": 3, "tasks": [] });
        store.save(&doc).unwrap();
        assert_eq!(store.load(), Some(doc));
    }
}
