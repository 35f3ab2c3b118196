use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;
use super::id::{NoteId, PatientId, TaskId};

/// A follow-up item for the care team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub patient_id: PatientId,
    pub title: String,
    pub assignee: Option<String>,
    pub due: Option<NaiveDate>,
    pub status: TaskStatus,
    pub linked_note_id: Option<NoteId>,
}

/// Input for creating a task. Any supplied status is ignored: tasks
/// always start `Open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub patient_id: PatientId,
    pub title: String,
    pub assignee: Option<String>,
    pub due: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub linked_note_id: Option<NoteId>,
}
