use serde::{Deserialize, Serialize};

use super::assessment::Assessment;
use super::contact::Contact;
use super::enums::Role;
use super::file::FileRecord;
use super::note::Note;
use super::patient::Patient;
use super::task::Task;

/// Current schema version. Stored documents carrying any other version
/// tag are reshaped by the migrator before use.
pub const SCHEMA_VERSION: u32 = 3;

/// The single root document: every collection the app works with,
/// persisted and replaced as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Casebook {
    pub version: u32,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub roles_directory: Vec<RoleEntry>,
}

impl Casebook {
    /// A fresh empty document at the current schema version.
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            patients: Vec::new(),
            notes: Vec::new(),
            assessments: Vec::new(),
            contacts: Vec::new(),
            tasks: Vec::new(),
            files: Vec::new(),
            roles_directory: Vec::new(),
        }
    }
}

/// One name-to-role binding in the roles directory. A name may appear
/// at most once for the lifetime of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEntry {
    pub name: String,
    pub role: Role,
}
