//! Parkinson's voice-measure encoder (22 features)

use crate::ordinal::{AnswerReader, Encoded, OrdinalScale};
use crate::FeatureEncoder;
use medpredict_core::Domain;
use serde::{Deserialize, Serialize};

const SEVERITY: OrdinalScale =
    OrdinalScale::new(&[("no", 0), ("mild", 1), ("moderate", 2), ("severe", 3)]);

/// Population-mean voice measures used as the starting point
const BASELINE: [f64; 22] = [
    119.992, 157.302, 74.997, 0.00784, 0.00007, 0.0037, 0.00554, 0.01109, 0.04374, 0.426,
    0.02182, 0.0313, 0.02971, 0.06545, 0.02211, 21.033, 0.414783, 0.815285, -4.813031,
    0.266482, 2.301442, 0.284654,
];

/// Jitter and shimmer columns scaled by reported symptom severity
const SEVERITY_SCALED: [usize; 9] = [3, 4, 5, 6, 7, 8, 9, 13, 14];

/// Parkinson's questionnaire as submitted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkinsonsInput {
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub age: f64,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub speech_problems: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub handwriting_changes: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub tremors: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub balance_issues: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub stiffness: String,
}

/// Encoder for the Parkinson's model
#[derive(Debug, Clone, Copy, Default)]
pub struct ParkinsonsEncoder;

impl FeatureEncoder for ParkinsonsEncoder {
    type Input = ParkinsonsInput;

    fn domain(&self) -> Domain {
        Domain::Parkinsons
    }

    fn encode(&self, input: &ParkinsonsInput) -> Encoded {
        let mut reader = AnswerReader::new(Domain::Parkinsons);

        let total: u32 = [
            ("speech_problems", input.speech_problems.as_str()),
            ("handwriting_changes", input.handwriting_changes.as_str()),
            ("tremors", input.tremors.as_str()),
            ("balance_issues", input.balance_issues.as_str()),
            ("stiffness", input.stiffness.as_str()),
        ]
        .into_iter()
        .map(|(field, raw)| reader.level(field, &SEVERITY, raw) as u32)
        .sum();

        let multiplier = total as f64 / 5.0;

        let mut features = BASELINE.to_vec();
        for &idx in SEVERITY_SCALED.iter() {
            features[idx] *= 1.0 + multiplier;
        }

        reader.finish(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_symptoms_returns_baseline() {
        let input = ParkinsonsInput {
            age: 61.0,
            speech_problems: "no".into(),
            handwriting_changes: "no".into(),
            tremors: "no".into(),
            balance_issues: "no".into(),
            stiffness: "no".into(),
        };
        let encoded = ParkinsonsEncoder.encode(&input);
        assert_eq!(encoded.features.as_slice(), &BASELINE);
    }

    #[test]
    fn test_severity_scales_only_jitter_and_shimmer() {
        // total 10 -> multiplier 2.0 -> scale factor 3.0
        let input = ParkinsonsInput {
            age: 70.0,
            speech_problems: "severe".into(),
            handwriting_changes: "moderate".into(),
            tremors: "severe".into(),
            balance_issues: "mild".into(),
            stiffness: "mild".into(),
        };
        let encoded = ParkinsonsEncoder.encode(&input);
        let f = encoded.features.as_slice();

        assert_eq!(f.len(), 22);
        for (idx, (value, base)) in f.iter().zip(BASELINE.iter()).enumerate() {
            if SEVERITY_SCALED.contains(&idx) {
                assert!((value - base * 3.0).abs() < 1e-12, "index {idx}");
            } else {
                assert_eq!(value, base, "index {idx}");
            }
        }
    }
}
