//! Schema migration for stored casebook documents.
//!
//! Older installs persisted patients under a different shape: a national
//! identifier doubling as id and MRN, one free-text name, and a single
//! phone string. `migrate_to_current` reshapes such documents to the
//! current schema and writes them back, once, before the repository
//! touches the store. Malformed legacy fields degrade to safe defaults
//! rather than failing the migration.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{Casebook, Patient, PatientId, SCHEMA_VERSION};

use super::{CasebookStore, StoreError};

/// Bring the stored casebook up to the current schema version.
///
/// A cold store and an already-current document are no-ops, so this is
/// idempotent and safe to run at every startup.
pub fn migrate_to_current<S: CasebookStore>(store: &mut S) -> Result<(), StoreError> {
    let Some(stored) = store.load() else {
        tracing::debug!("No stored casebook, nothing to migrate");
        return Ok(());
    };

    if is_current(&stored) {
        tracing::debug!("Stored casebook already at schema version {SCHEMA_VERSION}");
        return Ok(());
    }

    let found = version_label(&stored);
    let upgraded = upgrade_legacy(&stored);
    let doc = serde_json::to_value(&upgraded).map_err(|e| StoreError::MigrationFailed {
        version: SCHEMA_VERSION as i64,
        reason: e.to_string(),
    })?;
    store.save(&doc).map_err(|e| StoreError::MigrationFailed {
        version: SCHEMA_VERSION as i64,
        reason: e.to_string(),
    })?;

    tracing::info!(
        from = %found,
        to = SCHEMA_VERSION,
        patients = upgraded.patients.len(),
        "Casebook migrated"
    );
    Ok(())
}

/// Whether a stored document already carries the current version tag.
pub(crate) fn is_current(stored: &Value) -> bool {
    stored.get("version").and_then(Value::as_u64) == Some(SCHEMA_VERSION as u64)
}

fn version_label(stored: &Value) -> String {
    match stored.get("version") {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// Reshape a legacy document into a current casebook.
///
/// Collections that already match the current record shapes are copied
/// forward; records that cannot be read are dropped with a warning.
/// Patients get field-by-field treatment because their shape changed.
pub fn upgrade_legacy(stored: &Value) -> Casebook {
    let patients = stored
        .get("patients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    if item.is_object() {
                        Some(upgrade_patient(item))
                    } else {
                        tracing::warn!("Dropping malformed legacy patient entry");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Casebook {
        version: SCHEMA_VERSION,
        patients,
        notes: typed_records(stored, "notes"),
        assessments: typed_records(stored, "assessments"),
        contacts: typed_records(stored, "contacts"),
        tasks: typed_records(stored, "tasks"),
        files: typed_records(stored, "files"),
        roles_directory: typed_records(stored, "rolesDirectory"),
    }
}

/// Map one legacy patient record onto the current shape. Absent or
/// unreadable fields become empty defaults; a patient with no usable
/// id at all gets a generated one.
fn upgrade_patient(raw: &Value) -> Patient {
    let id = string_field(raw, "id")
        .or_else(|| string_field(raw, "nationalId"))
        .map(PatientId::from_raw)
        .unwrap_or_else(PatientId::generate);
    let mrn = string_field(raw, "mrn").or_else(|| string_field(raw, "nationalId"));

    let mut phones = string_list_field(raw, "phones");
    if phones.is_empty() {
        if let Some(phone) = string_field(raw, "phone") {
            phones.push(phone);
        }
    }

    Patient {
        id,
        mrn,
        name: string_field(raw, "name").unwrap_or_default(),
        dob: date_field(raw, "dob"),
        diagnoses: string_list_field(raw, "diagnoses"),
        red_flags: string_list_field(raw, "redFlags"),
        last_visit: date_field(raw, "lastVisit"),
        phones,
        address: string_field(raw, "address"),
        tags: string_list_field(raw, "tags"),
    }
}

fn typed_records<T: DeserializeOwned>(stored: &Value, key: &str) -> Vec<T> {
    let Some(items) = stored.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(collection = key, "Dropping unreadable legacy record: {e}"),
        }
    }
    records
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn date_field(raw: &Value, key: &str) -> Option<NaiveDate> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn string_list_field(raw: &Value, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn legacy_doc() -> Value {
        json!({
            "version": 1,
            "patients": [{
                "nationalId": "1234567890",
                "name": "Ahmad Saleh",
                "phone": "0501234567",
                "diagnoses": ["DM2"]
            }]
        })
    }

    #[test]
    fn cold_store_is_noop() {
        let mut store = MemoryStore::new();
        migrate_to_current(&mut store).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn current_document_is_untouched() {
        let mut store = MemoryStore::new();
        let doc = serde_json::to_value(Casebook::empty()).unwrap();
        store.save(&doc).unwrap();
        migrate_to_current(&mut store).unwrap();
        assert_eq!(store.load(), Some(doc));
    }

    #[test]
    fn legacy_patient_is_reshaped() {
        let mut store = MemoryStore::new();
        store.save(&legacy_doc()).unwrap();
        migrate_to_current(&mut store).unwrap();

        let casebook: Casebook = serde_json::from_value(store.load().unwrap()).unwrap();
        assert_eq!(casebook.version, SCHEMA_VERSION);
        assert_eq!(casebook.patients.len(), 1);
        let patient = &casebook.patients[0];
        assert_eq!(patient.id.as_str(), "1234567890");
        assert_eq!(patient.mrn.as_deref(), Some("1234567890"));
        assert_eq!(patient.name, "Ahmad Saleh");
        assert_eq!(patient.phones, vec!["0501234567"]);
        assert_eq!(patient.diagnoses, vec!["DM2"]);
        assert!(patient.red_flags.is_empty());
        assert!(patient.dob.is_none());
    }

    #[test]
    fn migration_is_idempotent() {
        let mut store = MemoryStore::new();
        store.save(&legacy_doc()).unwrap();
        migrate_to_current(&mut store).unwrap();
        let once = store.load();
        migrate_to_current(&mut store).unwrap();
        assert_eq!(store.load(), once);
    }

    #[test]
    fn string_version_tag_is_normalized() {
        let mut store = MemoryStore::new();
        let mut doc = serde_json::to_value(Casebook::empty()).unwrap();
        doc["version"] = json!("3");
        doc["tasks"] = json!([{
            "id": "t_1_abc123",
            "patientId": "p_1_abc123",
            "title": "Call family",
            "status": "Open"
        }]);
        store.save(&doc).unwrap();
        migrate_to_current(&mut store).unwrap();

        let migrated = store.load().unwrap();
        assert_eq!(migrated["version"], json!(3));
        let casebook: Casebook = serde_json::from_value(migrated).unwrap();
        assert_eq!(casebook.tasks.len(), 1);
        assert_eq!(casebook.tasks[0].title, "Call family");
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let mut store = MemoryStore::new();
        store
            .save(&json!({
                "version": 2,
                "patients": [
                    { "name": "No Id", "dob": 12345, "diagnoses": "not-a-list" },
                    "garbage"
                ],
                "notes": [{ "hello": true }]
            }))
            .unwrap();
        migrate_to_current(&mut store).unwrap();

        let casebook: Casebook = serde_json::from_value(store.load().unwrap()).unwrap();
        assert_eq!(casebook.patients.len(), 1);
        let patient = &casebook.patients[0];
        assert_eq!(patient.name, "No Id");
        assert!(patient.id.as_str().starts_with("p_"));
        assert!(patient.dob.is_none());
        assert!(patient.diagnoses.is_empty());
        assert!(casebook.notes.is_empty());
    }

    #[test]
    fn missing_version_is_treated_as_legacy() {
        let mut store = MemoryStore::new();
        store.save(&json!({ "patients": [] })).unwrap();
        migrate_to_current(&mut store).unwrap();
        assert_eq!(store.load().unwrap()["version"], json!(3));
    }

    #[test]
    fn current_shaped_collections_are_copied_forward() {
        let mut store = MemoryStore::new();
        store
            .save(&json!({
                "version": 2,
                "patients": [{ "nationalId": "55", "name": "Huda" }],
                "rolesDirectory": [{ "name": "Fatima", "role": "Nurse" }],
                "files": [{
                    "id": "f_1_abc123",
                    "patientId": "55",
                    "filename": "xray.png",
                    "uploadedAt": "2024-01-10T08:30:00Z",
                    "size": 2048,
                    "mime": "image/png"
                }]
            }))
            .unwrap();
        migrate_to_current(&mut store).unwrap();

        let casebook: Casebook = serde_json::from_value(store.load().unwrap()).unwrap();
        assert_eq!(casebook.roles_directory.len(), 1);
        assert_eq!(casebook.roles_directory[0].name, "Fatima");
        assert_eq!(casebook.files.len(), 1);
        assert_eq!(casebook.files[0].filename, "xray.png");
        assert_eq!(casebook.files[0].size, 2048);
    }
}
