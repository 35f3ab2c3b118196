use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AssessmentId, FileId, NoteId, PatientId};

/// Metadata for an uploaded attachment. The core carries these records
/// through migration, export, and import but never creates them itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,
    pub patient_id: PatientId,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub size: u64,
    pub mime: String,
    pub linked_note_id: Option<NoteId>,
    pub linked_assessment_id: Option<AssessmentId>,
}
