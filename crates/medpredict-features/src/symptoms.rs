//! Shared-symptom (common disease) encoder
//!
//! Produces a one-hot vector over the externally supplied symptom-name table.
//! Free-text symptoms are mapped to canonical column names through a fixed
//! synonym table; anything unknown is dropped without comment.

use crate::ordinal::Encoded;
use crate::FeatureEncoder;
use medpredict_core::{Domain, FeatureVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client spelling -> canonical dataset column
const SYNONYMS: &[(&str, &str)] = &[
    ("fever", "fever"),
    ("headache", "headache"),
    ("cough", "cough"),
    ("sore throat", "sore_throat"),
    ("runny nose", "nasal_congestion"),
    ("body aches", "muscle_pain"),
    ("nausea", "nausea"),
    ("vomiting", "vomiting"),
    ("diarrhea", "diarrhea"),
    ("fatigue", "fatigue"),
    ("dizziness", "dizziness"),
    ("shortness of breath", "shortness_of_breath"),
    ("chest pain", "sharp_chest_pain"),
    ("abdominal pain", "sharp_abdominal_pain"),
    ("skin rash", "skin_rash"),
    ("joint pain", "joint_pain"),
];

/// Resolve a client symptom string to its canonical column name
pub fn canonical_symptom(symptom: &str) -> Option<&'static str> {
    let lowered = symptom.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, column)| *column)
}

/// Common-disease request as submitted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonInput {
    #[serde(default, deserialize_with = "crate::lenient::answers")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub duration: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub severity: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub age: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub medical_history: String,
}

/// Encoder bound to a symptom-name table
#[derive(Debug, Clone, Copy)]
pub struct SymptomEncoder<'a> {
    columns: &'a [String],
}

impl<'a> SymptomEncoder<'a> {
    /// Create an encoder over the given column names
    pub fn new(columns: &'a [String]) -> Self {
        Self { columns }
    }

    /// Number of features produced (the table length)
    pub fn arity(&self) -> usize {
        self.columns.len()
    }
}

impl FeatureEncoder for SymptomEncoder<'_> {
    type Input = CommonInput;

    fn domain(&self) -> Domain {
        Domain::Common
    }

    fn encode(&self, input: &CommonInput) -> Encoded {
        let mut features = FeatureVector::zeros(self.columns.len());

        for symptom in &input.symptoms {
            let Some(column) = canonical_symptom(symptom) else {
                debug!(symptom = %symptom, "Ignoring unmapped symptom");
                continue;
            };
            if let Some(idx) = self.columns.iter().position(|c| c == column) {
                features.set(idx, 1.0);
            }
        }

        Encoded {
            features,
            degraded: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        ["cough", "fever", "sore_throat", "nasal_congestion", "skin_rash"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_one_hot_over_table() {
        let columns = columns();
        let encoder = SymptomEncoder::new(&columns);
        let input = CommonInput {
            symptoms: vec!["Fever".into(), "runny nose".into(), "SORE THROAT".into()],
            ..Default::default()
        };

        let encoded = encoder.encode(&input);
        assert_eq!(encoded.features.as_slice(), &[0.0, 1.0, 1.0, 1.0, 0.0]);
        assert!(!encoded.is_degraded());
    }

    #[test]
    fn test_unknown_and_unlisted_symptoms_are_ignored() {
        let columns = columns();
        let encoder = SymptomEncoder::new(&columns);
        let input = CommonInput {
            // "headache" maps but is not in this table; "hiccups" does not map
            symptoms: vec!["headache".into(), "hiccups".into()],
            ..Default::default()
        };

        let encoded = encoder.encode(&input);
        assert_eq!(encoded.features.len(), encoder.arity());
        assert!(encoded.features.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_canonical_symptom() {
        assert_eq!(canonical_symptom("Chest Pain"), Some("sharp_chest_pain"));
        assert_eq!(canonical_symptom("body aches"), Some("muscle_pain"));
        assert_eq!(canonical_symptom("chest  pain"), None);
    }
}
