use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::Role;
use super::id::{AssessmentId, PatientId};

/// A structured clinical assessment. `fields` is an open bag of
/// template-specific answers the core stores without interpreting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: AssessmentId,
    pub patient_id: PatientId,
    pub created_at: DateTime<Utc>,
    pub role: Role,
    pub template_id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Input for recording an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    pub patient_id: PatientId,
    pub role: Role,
    pub template_id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}
