use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{NoteKind, Role};
use super::id::{AssessmentId, NoteId, PatientId, TaskId};

/// A care-team note. Append-only: once stored, never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub patient_id: PatientId,
    pub created_at: DateTime<Utc>,
    pub author_role: Role,
    pub author_name: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub tags: Option<Vec<String>>,
    pub text: String,
    pub linked_assessment_id: Option<AssessmentId>,
    pub linked_task_id: Option<TaskId>,
}

/// Input for adding a note. Carries no timestamp: the repository stamps
/// the note at append time, so callers cannot backdate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub patient_id: PatientId,
    pub author_role: Role,
    pub author_name: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub tags: Option<Vec<String>>,
    pub text: String,
    pub linked_assessment_id: Option<AssessmentId>,
    pub linked_task_id: Option<TaskId>,
}
