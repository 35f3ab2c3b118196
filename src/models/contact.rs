use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ContactChannel, Role};
use super::id::{ContactId, PatientId};

/// A logged touchpoint with a patient or their family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub patient_id: PatientId,
    pub when: DateTime<Utc>,
    pub channel: ContactChannel,
    pub summary: String,
    pub outcome: Option<String>,
    pub author_name: Option<String>,
    pub author_role: Option<Role>,
}

/// Input for logging a contact. `when` defaults to the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub patient_id: PatientId,
    pub when: Option<DateTime<Utc>>,
    pub channel: ContactChannel,
    pub summary: String,
    pub outcome: Option<String>,
    pub author_name: Option<String>,
    pub author_role: Option<Role>,
}
