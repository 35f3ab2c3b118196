use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::PatientId;

/// A patient on the agency's caseload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub mrn: Option<String>,
    pub name: String,
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub last_visit: Option<NaiveDate>,
    #[serde(default)]
    pub phones: Vec<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for registering a patient. The repository assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub mrn: Option<String>,
    pub name: String,
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub last_visit: Option<NaiveDate>,
    #[serde(default)]
    pub phones: Vec<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_uses_camel_case_wire_keys() {
        let patient = Patient {
            id: PatientId::from_raw("p_1_abc123"),
            mrn: Some("K-1".into()),
            name: "Ahmad".into(),
            dob: None,
            diagnoses: vec!["DM2".into()],
            red_flags: vec!["fall risk".into()],
            last_visit: NaiveDate::from_ymd_opt(2024, 3, 15),
            phones: vec!["0501234567".into()],
            address: None,
            tags: Vec::new(),
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["redFlags"][0], "fall risk");
        assert_eq!(json["lastVisit"], "2024-03-15");
        assert!(json.get("red_flags").is_none());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let patient: Patient =
            serde_json::from_value(serde_json::json!({ "id": "p_1_abc123", "name": "Ahmad" }))
                .unwrap();
        assert!(patient.diagnoses.is_empty());
        assert!(patient.phones.is_empty());
        assert!(patient.mrn.is_none());
    }
}
