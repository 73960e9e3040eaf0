//! Diabetes survey encoder (8 features)
//!
//! Feature order follows the training dataset: pregnancies, glucose, blood
//! pressure, skin thickness, insulin, BMI, pedigree function, age. Each
//! self-reported symptom drives one proxy column linearly from a fixed base.

use crate::ordinal::{AnswerReader, Encoded, OrdinalScale};
use crate::FeatureEncoder;
use medpredict_core::Domain;
use serde::{Deserialize, Serialize};

const FREQUENCY: OrdinalScale = OrdinalScale::new(&[
    ("never", 0),
    ("rarely", 1),
    ("sometimes", 2),
    ("often", 3),
    ("always", 4),
]);

const URINATION: OrdinalScale = OrdinalScale::new(&[
    ("no", 0),
    ("never", 0),
    ("slight", 1),
    ("little", 1),
    ("moderate", 2),
    ("much", 3),
    ("extremely", 4),
]);

const WEIGHT_LOSS: OrdinalScale = OrdinalScale::new(&[
    ("no", 0),
    ("none", 0),
    ("slight", 1),
    ("moderate", 2),
    ("significant", 3),
]);

const VISION: OrdinalScale = OrdinalScale::new(&[
    ("never", 0),
    ("occasionally", 1),
    ("rarely", 1),
    ("sometimes", 2),
    ("frequently", 2),
    ("constantly", 3),
]);

const HEALING: OrdinalScale = OrdinalScale::new(&[
    ("normal", 0),
    ("slightly", 1),
    ("little", 1),
    ("moderate", 2),
    ("very", 3),
    ("much", 4),
]);

const PREGNANCIES: f64 = 1.0;
const SKIN_THICKNESS: f64 = 20.0;

/// Diabetes questionnaire as submitted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiabetesInput {
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub excessive_thirst: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub frequent_urination: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub unexplained_weight_loss: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub fatigue: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub blurred_vision: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub slow_healing_wounds: String,
}

/// Encoder for the diabetes model
#[derive(Debug, Clone, Copy, Default)]
pub struct DiabetesEncoder;

impl FeatureEncoder for DiabetesEncoder {
    type Input = DiabetesInput;

    fn domain(&self) -> Domain {
        Domain::Diabetes
    }

    fn encode(&self, input: &DiabetesInput) -> Encoded {
        let mut reader = AnswerReader::new(Domain::Diabetes);

        let thirst = reader.level("excessiveThirst", &FREQUENCY, &input.excessive_thirst) as f64;
        let fatigue = reader.level("fatigue", &FREQUENCY, &input.fatigue) as f64;
        let urination =
            reader.level("frequentUrination", &URINATION, &input.frequent_urination) as f64;
        let weight = reader.level(
            "unexplainedWeightLoss",
            &WEIGHT_LOSS,
            &input.unexplained_weight_loss,
        ) as f64;
        let vision = reader.level("blurredVision", &VISION, &input.blurred_vision) as f64;
        let healing = reader.level("slowHealingWounds", &HEALING, &input.slow_healing_wounds) as f64;

        let glucose = 120.0 + thirst * 20.0;
        let blood_pressure = 80.0 + fatigue * 5.0;
        let insulin = 80.0 + urination * 30.0;
        let bmi = 25.0 + weight * 2.0;
        let pedigree = 0.5 + vision * 0.2;
        let age = 40.0 + healing * 5.0;

        reader.finish(vec![
            PREGNANCIES,
            glucose,
            blood_pressure,
            SKIN_THICKNESS,
            insulin,
            bmi,
            pedigree,
            age,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_reference_questionnaire() {
        let input = DiabetesInput {
            excessive_thirst: "often".into(),
            frequent_urination: "much".into(),
            unexplained_weight_loss: "moderate".into(),
            fatigue: "often".into(),
            blurred_vision: "frequently".into(),
            slow_healing_wounds: "much".into(),
        };

        let encoded = DiabetesEncoder.encode(&input);
        assert!(!encoded.is_degraded());
        assert!(approx_eq(
            encoded.features.as_slice(),
            &[1.0, 180.0, 95.0, 20.0, 170.0, 29.0, 0.9, 60.0]
        ));
    }

    #[test]
    fn test_unknown_answers_fall_back_to_baseline() {
        let input = DiabetesInput {
            excessive_thirst: "constantly thirsty".into(),
            ..Default::default()
        };

        let encoded = DiabetesEncoder.encode(&input);
        assert_eq!(encoded.degraded.len(), 6);
        assert!(approx_eq(
            encoded.features.as_slice(),
            &[1.0, 120.0, 80.0, 20.0, 80.0, 25.0, 0.5, 40.0]
        ));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let json = r#"{"excessiveThirst":"never","frequentUrination":"no","unexplainedWeightLoss":"no",
            "fatigue":"never","blurredVision":"never","slowHealingWounds":"normal"}"#;
        let input: DiabetesInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.slow_healing_wounds, "normal");
        assert!(!DiabetesEncoder.encode(&input).is_degraded());
    }

    #[test]
    fn test_wrong_typed_answers_degrade_instead_of_failing() {
        let json = r#"{"excessiveThirst":3,"frequentUrination":"much","unexplainedWeightLoss":null,
            "fatigue":true,"blurredVision":["x"],"slowHealingWounds":4}"#;
        let input: DiabetesInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.excessive_thirst, "3");

        let encoded = DiabetesEncoder.encode(&input);
        let fields: Vec<&str> = encoded.degraded.iter().map(|d| d.field).collect();
        assert_eq!(fields, ["fatigue", "unexplainedWeightLoss", "blurredVision"]);
        assert!(approx_eq(
            encoded.features.as_slice(),
            &[1.0, 180.0, 80.0, 20.0, 170.0, 25.0, 0.5, 60.0]
        ));
    }
}
