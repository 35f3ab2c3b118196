use serde::{Deserialize, Serialize};

/// Macro to generate string-backed id newtypes sharing the
/// `{prefix}_{epochMillis}_{base36Suffix}` generation scheme.
macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an id that already exists (imported or migrated data).
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Generate a fresh id.
            pub fn generate() -> Self {
                Self(generate_raw($prefix))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(PatientId, "p");
entity_id!(NoteId, "n");
entity_id!(AssessmentId, "a");
entity_id!(ContactId, "c");
entity_id!(TaskId, "t");
entity_id!(FileId, "f");

const SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Millisecond timestamp plus a random base36 suffix. No central counter:
/// the store is purely local, so this is unique enough in practice.
fn generate_raw(prefix: &str) -> String {
    use rand::Rng;

    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}_{millis}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_entity_prefix() {
        assert!(PatientId::generate().as_str().starts_with("p_"));
        assert!(NoteId::generate().as_str().starts_with("n_"));
        assert!(AssessmentId::generate().as_str().starts_with("a_"));
        assert!(ContactId::generate().as_str().starts_with("c_"));
        assert!(TaskId::generate().as_str().starts_with("t_"));
        assert!(FileId::generate().as_str().starts_with("f_"));
    }

    #[test]
    fn generated_id_has_millis_and_suffix_segments() {
        let id = NoteId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "n");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..100)
            .map(|_| PatientId::generate().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = PatientId::from_raw("p_1_abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p_1_abc123\"");
        let back: PatientId = serde_json::from_str("\"p_1_abc123\"").unwrap();
        assert_eq!(back, id);
    }
}
