//! Repository over the casebook document.
//!
//! Every operation follows the same shape: lock the store, load the
//! current document, change it in memory, persist the whole document,
//! return the affected record(s). The lock spans the full round trip
//! so concurrent writers cannot lose each other's appends, and each
//! mutating operation performs exactly one persist call, so a failed
//! save means nothing changed.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    Assessment, AssessmentId, Casebook, Contact, ContactId, FileRecord, NewAssessment, NewContact,
    NewNote, NewPatient, NewTask, Note, NoteId, NoteKind, Patient, PatientId, Role, RoleEntry,
    Task, TaskId, TaskStatus, SCHEMA_VERSION,
};
use crate::store::{migrate, CasebookStore, SqliteStore, StoreError};

/// Author recorded on derived notes when the source record names no one.
pub const SYSTEM_AUTHOR: &str = "system";

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Author '{name}' is already registered as {existing}, cannot register as {requested}")]
    RoleConflict {
        name: String,
        existing: Role,
        requested: Role,
    },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid casebook payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// What an import installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub patients: usize,
    pub notes: usize,
    pub assessments: usize,
    pub contacts: usize,
    pub tasks: usize,
    pub files: usize,
    pub roles: usize,
    pub migrated: bool,
}

// ═══════════════════════════════════════════════════════════
// Repo
// ═══════════════════════════════════════════════════════════

/// The only supported entry point for reading and mutating the
/// casebook. Generic over the storage port so the logic runs unchanged
/// against the durable SQLite store or the in-memory double.
pub struct Repo<S: CasebookStore> {
    store: Mutex<S>,
}

impl Repo<SqliteStore> {
    /// Open (or create) the durable store at `path`, migrate it, and
    /// wrap it in a repository.
    pub fn open(path: &Path) -> Result<Self, RepoError> {
        let mut store = SqliteStore::open(path)?;
        migrate::migrate_to_current(&mut store)?;
        Ok(Self::new(store))
    }

    /// An ephemeral repository for tests and previews.
    pub fn open_in_memory() -> Result<Self, RepoError> {
        let mut store = SqliteStore::open_in_memory()?;
        migrate::migrate_to_current(&mut store)?;
        Ok(Self::new(store))
    }
}

impl<S: CasebookStore> Repo<S> {
    /// Wrap an already-opened store. The caller is responsible for
    /// having run the migrator; a store holding a stale document is
    /// reinitialized fresh on first use.
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, RepoError> {
        self.store.lock().map_err(|_| RepoError::LockPoisoned)
    }

    /// Load the current document, installing a fresh empty one first if
    /// the store is cold or holds something unusable.
    fn load_casebook(store: &mut S) -> Result<Casebook, RepoError> {
        if let Some(stored) = store.load() {
            if migrate::is_current(&stored) {
                match serde_json::from_value::<Casebook>(stored) {
                    Ok(casebook) => return Ok(casebook),
                    Err(e) => {
                        tracing::error!("Stored casebook is unreadable, reinitializing: {e}");
                    }
                }
            } else {
                tracing::warn!("Stored casebook has a stale version tag, reinitializing");
            }
        }

        let fresh = Casebook::empty();
        Self::persist(store, &fresh)?;
        tracing::info!(version = SCHEMA_VERSION, "Initialized fresh casebook");
        Ok(fresh)
    }

    fn persist(store: &mut S, casebook: &Casebook) -> Result<(), RepoError> {
        let doc = serde_json::to_value(casebook)?;
        store.save(&doc)?;
        Ok(())
    }

    // ── Patients ────────────────────────────────────────────

    /// All patients on the caseload, in registration order.
    pub fn list_patients(&self) -> Result<Vec<Patient>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(casebook.patients)
    }

    /// A single patient, or `None`. A missing id is not an error.
    pub fn get_patient(&self, id: &PatientId) -> Result<Option<Patient>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(casebook.patients.into_iter().find(|p| &p.id == id))
    }

    /// Register a patient. No dedup on MRN or name: duplicates are the
    /// caller's problem to warn about.
    pub fn add_patient(&self, new: NewPatient) -> Result<Patient, RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        let patient = Patient {
            id: PatientId::generate(),
            mrn: new.mrn,
            name: new.name,
            dob: new.dob,
            diagnoses: new.diagnoses,
            red_flags: new.red_flags,
            last_visit: new.last_visit,
            phones: new.phones,
            address: new.address,
            tags: new.tags,
        };
        casebook.patients.push(patient.clone());
        Self::persist(&mut store, &casebook)?;
        Ok(patient)
    }

    // ── Notes ───────────────────────────────────────────────

    /// Notes in append order, optionally narrowed to one patient.
    pub fn list_notes(&self, patient_id: Option<&PatientId>) -> Result<Vec<Note>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(filter_by_patient(casebook.notes, patient_id, |n| {
            &n.patient_id
        }))
    }

    /// Append a note, stamped at append time.
    ///
    /// Fails with `RoleConflict` when the author's name is registered in
    /// the roles directory under a different role; nothing is persisted
    /// in that case. An unregistered name passes: registration itself
    /// happens through [`Repo::upsert_role`].
    pub fn add_note(&self, new: NewNote) -> Result<Note, RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;
        check_role(&casebook, &new.author_name, &new.author_role)?;

        let note = Note {
            id: NoteId::generate(),
            patient_id: new.patient_id,
            created_at: Utc::now(),
            author_role: new.author_role,
            author_name: new.author_name,
            kind: new.kind,
            tags: new.tags,
            text: new.text,
            linked_assessment_id: new.linked_assessment_id,
            linked_task_id: new.linked_task_id,
        };
        casebook.notes.push(note.clone());
        Self::persist(&mut store, &casebook)?;
        Ok(note)
    }

    // ── Assessments ─────────────────────────────────────────

    pub fn list_assessments(
        &self,
        patient_id: Option<&PatientId>,
    ) -> Result<Vec<Assessment>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(filter_by_patient(casebook.assessments, patient_id, |a| {
            &a.patient_id
        }))
    }

    /// Record an assessment. A system-authored note of kind
    /// `assessment` pointing back at it lands in the same persist call:
    /// a failed save installs neither record.
    pub fn add_assessment(&self, new: NewAssessment) -> Result<(Assessment, Note), RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        let assessment = Assessment {
            id: AssessmentId::generate(),
            patient_id: new.patient_id.clone(),
            created_at: Utc::now(),
            role: new.role,
            template_id: new.template_id,
            fields: new.fields,
        };
        let note = Note {
            id: NoteId::generate(),
            patient_id: new.patient_id,
            created_at: assessment.created_at,
            author_role: Role::System,
            author_name: SYSTEM_AUTHOR.to_string(),
            kind: NoteKind::Assessment,
            tags: None,
            text: format!("Assessment recorded from template {}", assessment.template_id),
            linked_assessment_id: Some(assessment.id.clone()),
            linked_task_id: None,
        };
        casebook.assessments.push(assessment.clone());
        casebook.notes.push(note.clone());
        Self::persist(&mut store, &casebook)?;
        Ok((assessment, note))
    }

    // ── Contacts ────────────────────────────────────────────

    pub fn list_contacts(
        &self,
        patient_id: Option<&PatientId>,
    ) -> Result<Vec<Contact>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(filter_by_patient(casebook.contacts, patient_id, |c| {
            &c.patient_id
        }))
    }

    /// Log a contact. Same derived-note pattern as assessments: a note
    /// of kind `contact` summarizing channel, summary, and outcome is
    /// appended in the same persist call, authored by the contact's
    /// author or the system placeholder.
    pub fn add_contact(&self, new: NewContact) -> Result<(Contact, Note), RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        let contact = Contact {
            id: ContactId::generate(),
            patient_id: new.patient_id.clone(),
            when: new.when.unwrap_or_else(Utc::now),
            channel: new.channel,
            summary: new.summary,
            outcome: new.outcome,
            author_name: new.author_name,
            author_role: new.author_role,
        };
        let text = match &contact.outcome {
            Some(outcome) => format!(
                "{} contact: {} (outcome: {})",
                contact.channel.as_str(),
                contact.summary,
                outcome
            ),
            None => format!("{} contact: {}", contact.channel.as_str(), contact.summary),
        };
        let note = Note {
            id: NoteId::generate(),
            patient_id: new.patient_id,
            created_at: Utc::now(),
            author_role: contact.author_role.clone().unwrap_or(Role::System),
            author_name: contact
                .author_name
                .clone()
                .unwrap_or_else(|| SYSTEM_AUTHOR.to_string()),
            kind: NoteKind::Contact,
            tags: None,
            text,
            linked_assessment_id: None,
            linked_task_id: None,
        };
        casebook.contacts.push(contact.clone());
        casebook.notes.push(note.clone());
        Self::persist(&mut store, &casebook)?;
        Ok((contact, note))
    }

    // ── Tasks ───────────────────────────────────────────────

    pub fn list_tasks(&self, patient_id: Option<&PatientId>) -> Result<Vec<Task>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(filter_by_patient(casebook.tasks, patient_id, |t| {
            &t.patient_id
        }))
    }

    /// Create a task. Status always starts `Open`: tasks cannot be
    /// created already done.
    pub fn add_task(&self, new: NewTask) -> Result<Task, RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        if let Some(requested) = &new.status {
            if *requested != TaskStatus::Open {
                tracing::debug!("Ignoring requested task status {requested}, tasks start Open");
            }
        }
        let task = Task {
            id: TaskId::generate(),
            patient_id: new.patient_id,
            title: new.title,
            assignee: new.assignee,
            due: new.due,
            status: TaskStatus::Open,
            linked_note_id: new.linked_note_id,
        };
        casebook.tasks.push(task.clone());
        Self::persist(&mut store, &casebook)?;
        Ok(task)
    }

    /// Flip an existing task's status. Unknown ids are an error.
    pub fn set_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        let Some(task) = casebook.tasks.iter_mut().find(|t| &t.id == id) else {
            return Err(RepoError::NotFound {
                entity_type: "task".to_string(),
                id: id.to_string(),
            });
        };
        task.status = status;
        let updated = task.clone();
        Self::persist(&mut store, &casebook)?;
        Ok(updated)
    }

    // ── Files ───────────────────────────────────────────────

    /// File metadata in append order. The core never creates these;
    /// they arrive through import and ride along through migration.
    pub fn list_files(&self, patient_id: Option<&PatientId>) -> Result<Vec<FileRecord>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(filter_by_patient(casebook.files, patient_id, |f| {
            &f.patient_id
        }))
    }

    // ── Roles directory ─────────────────────────────────────

    pub fn roles_directory(&self) -> Result<Vec<RoleEntry>, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(casebook.roles_directory)
    }

    /// Register or confirm an author's role: the authoritative site of
    /// the one-role-per-name rule. An existing binding to a different
    /// role is a conflict; repeating the same binding is a no-op.
    pub fn upsert_role(&self, name: &str, role: Role) -> Result<RoleEntry, RepoError> {
        let mut store = self.lock_store()?;
        let mut casebook = Self::load_casebook(&mut store)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(RepoError::ConstraintViolation(
                "role entry needs a non-empty name".to_string(),
            ));
        }

        if let Some(entry) = casebook.roles_directory.iter().find(|e| e.name == name) {
            if entry.role == role {
                return Ok(entry.clone());
            }
            return Err(RepoError::RoleConflict {
                name: name.to_string(),
                existing: entry.role.clone(),
                requested: role,
            });
        }

        let entry = RoleEntry {
            name: name.to_string(),
            role,
        };
        casebook.roles_directory.push(entry.clone());
        Self::persist(&mut store, &casebook)?;
        Ok(entry)
    }

    // ── Export / import ─────────────────────────────────────

    /// The full document as pretty-printed JSON, usable as a backup.
    pub fn export_all(&self) -> Result<String, RepoError> {
        let mut store = self.lock_store()?;
        let casebook = Self::load_casebook(&mut store)?;
        Ok(serde_json::to_string_pretty(&casebook)?)
    }

    /// Replace the stored document with an exported payload.
    ///
    /// Legacy payloads are reshaped to the current schema first, and
    /// the incoming roles directory must be internally consistent: one
    /// name bound to two roles rejects the whole import before anything
    /// is written. Exact duplicate entries are collapsed.
    pub fn import_all(&self, payload: &str) -> Result<ImportSummary, RepoError> {
        let incoming: Value = serde_json::from_str(payload)?;

        let (mut casebook, migrated) = if migrate::is_current(&incoming) {
            (serde_json::from_value::<Casebook>(incoming)?, false)
        } else {
            (migrate::upgrade_legacy(&incoming), true)
        };
        casebook.roles_directory =
            validate_roles_directory(std::mem::take(&mut casebook.roles_directory))?;

        let mut store = self.lock_store()?;
        Self::persist(&mut store, &casebook)?;

        let summary = ImportSummary {
            patients: casebook.patients.len(),
            notes: casebook.notes.len(),
            assessments: casebook.assessments.len(),
            contacts: casebook.contacts.len(),
            tasks: casebook.tasks.len(),
            files: casebook.files.len(),
            roles: casebook.roles_directory.len(),
            migrated,
        };
        tracing::info!(
            patients = summary.patients,
            notes = summary.notes,
            migrated = summary.migrated,
            "Casebook imported"
        );
        Ok(summary)
    }
}

fn filter_by_patient<T>(
    records: Vec<T>,
    patient_id: Option<&PatientId>,
    key: impl Fn(&T) -> &PatientId,
) -> Vec<T> {
    match patient_id {
        Some(id) => records.into_iter().filter(|r| key(r) == id).collect(),
        None => records,
    }
}

/// Read-only consult of the roles directory: a name registered under a
/// different role than the one declared is a conflict.
fn check_role(casebook: &Casebook, name: &str, requested: &Role) -> Result<(), RepoError> {
    match casebook
        .roles_directory
        .iter()
        .find(|entry| entry.name == name)
    {
        Some(entry) if entry.role != *requested => Err(RepoError::RoleConflict {
            name: name.to_string(),
            existing: entry.role.clone(),
            requested: requested.clone(),
        }),
        _ => Ok(()),
    }
}

/// Collapse exact duplicates; reject a name bound to two roles.
fn validate_roles_directory(entries: Vec<RoleEntry>) -> Result<Vec<RoleEntry>, RepoError> {
    let mut seen: Vec<RoleEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match seen.iter().find(|e| e.name == entry.name) {
            Some(existing) if existing.role == entry.role => {}
            Some(existing) => {
                return Err(RepoError::RoleConflict {
                    name: entry.name.clone(),
                    existing: existing.role.clone(),
                    requested: entry.role,
                });
            }
            None => seen.push(entry),
        }
    }
    Ok(seen)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
