//! Heart disease survey encoder (13 features)
//!
//! Column order: age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang,
//! oldpeak, slope, ca, thal.
//!
//! Several columns deliberately run "backwards" relative to clinical
//! intuition. In the training data the healthy cohort showed slightly higher
//! resting blood pressure, cholesterol, ST depression and exercise angina
//! rates, so symptom-free answers map to those healthy-cohort values.

use crate::ordinal::{AnswerReader, Encoded, OrdinalScale};
use crate::FeatureEncoder;
use medpredict_core::Domain;
use serde::{Deserialize, Serialize};

const CHEST_PAIN: OrdinalScale = OrdinalScale::new(&[
    ("never", 0),
    ("rarely", 1),
    ("sometimes", 2),
    ("often", 3),
]);

const BREATHING: OrdinalScale =
    OrdinalScale::new(&[("no", 0), ("mild", 1), ("moderate", 2), ("severe", 3)]);

const FATIGUE: OrdinalScale = OrdinalScale::new(&[
    ("never", 0),
    ("sometimes", 1),
    ("often", 2),
    ("always", 3),
]);

const HEART_RATE: OrdinalScale = OrdinalScale::new(&[
    ("slow", 0),
    ("normal", 1),
    ("fast", 2),
    ("very_fast", 3),
])
.with_sentinel(1);

const EXERCISE: OrdinalScale = OrdinalScale::new(&[
    ("daily", 0),
    ("weekly", 1),
    ("monthly", 2),
    ("never", 3),
])
.with_sentinel(1);

/// Representative age per bucket; unknown buckets use 50
const AGE_BUCKETS: OrdinalScale = OrdinalScale::new(&[
    ("under_30", 45),
    ("30_50", 50),
    ("50_70", 58),
    ("over_70", 65),
])
.with_sentinel(50);

const SEX: f64 = 1.0;

/// Heart questionnaire as submitted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartInput {
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub chest_pain: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub breathing_difficulty: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub fatigue: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub heart_rate: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub age: String,
    #[serde(default, deserialize_with = "crate::lenient::answer")]
    pub exercise_habits: String,
}

/// Encoder for the heart disease model
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartEncoder;

impl FeatureEncoder for HeartEncoder {
    type Input = HeartInput;

    fn domain(&self) -> Domain {
        Domain::Heart
    }

    fn encode(&self, input: &HeartInput) -> Encoded {
        let mut reader = AnswerReader::new(Domain::Heart);

        let age = reader.level("age", &AGE_BUCKETS, &input.age) as f64;
        let chest_pain = reader.level("chestPain", &CHEST_PAIN, &input.chest_pain) as u32;
        let breathing =
            reader.level("breathingDifficulty", &BREATHING, &input.breathing_difficulty) as u32;
        let fatigue = reader.level("fatigue", &FATIGUE, &input.fatigue) as u32;
        let heart_rate = reader.level("heartRate", &HEART_RATE, &input.heart_rate);
        let exercise = reader.level("exerciseHabits", &EXERCISE, &input.exercise_habits);

        let trestbps = if breathing == 0 {
            135.0
        } else {
            (130.0 + breathing as f64 * 8.0).clamp(110.0, 180.0)
        };

        let chol = if fatigue == 0 {
            250.0
        } else {
            (240.0 + fatigue as f64 * 25.0).clamp(180.0, 450.0)
        };

        let fbs = if fatigue >= 2 || breathing >= 2 { 1.0 } else { 0.0 };
        let restecg = ((breathing + fatigue) / 3).min(2) as f64;

        let thalach = match heart_rate {
            0 => 135.0,
            1 if exercise <= 1 => 140.0,
            1 => 150.0,
            2 => 160.0,
            _ => 175.0,
        };

        let exang = if exercise <= 1 && age > 55.0 { 1.0 } else { 0.0 };

        let symptom_count = chest_pain + breathing + fatigue;
        let oldpeak = match symptom_count {
            0 => 1.8,
            1..=2 => 1.5,
            3..=4 => 1.2,
            _ => 0.8,
        };
        let slope = if symptom_count <= 3 { 1.0 } else { 2.0 };
        let ca = if symptom_count <= 2 { 1.0 } else { 0.0 };
        let thal = if symptom_count == 0 { 3.0 } else { 2.0 };

        reader.finish(vec![
            age,
            SEX,
            chest_pain as f64,
            trestbps,
            chol,
            fbs,
            restecg,
            thalach,
            exang,
            oldpeak,
            slope,
            ca,
            thal,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        chest_pain: &str,
        breathing: &str,
        fatigue: &str,
        heart_rate: &str,
        age: &str,
        exercise: &str,
    ) -> HeartInput {
        HeartInput {
            chest_pain: chest_pain.into(),
            breathing_difficulty: breathing.into(),
            fatigue: fatigue.into(),
            heart_rate: heart_rate.into(),
            age: age.into(),
            exercise_habits: exercise.into(),
        }
    }

    #[test]
    fn test_symptom_free_uses_healthy_baselines() {
        let encoded = HeartEncoder.encode(&input("never", "no", "never", "normal", "50_70", "daily"));
        assert!(!encoded.is_degraded());
        assert_eq!(
            encoded.features.as_slice(),
            &[58.0, 1.0, 0.0, 135.0, 250.0, 0.0, 0.0, 140.0, 1.0, 1.8, 1.0, 1.0, 3.0]
        );
    }

    #[test]
    fn test_severe_symptoms() {
        let encoded =
            HeartEncoder.encode(&input("often", "severe", "always", "very_fast", "over_70", "never"));
        assert_eq!(
            encoded.features.as_slice(),
            &[65.0, 1.0, 3.0, 154.0, 315.0, 1.0, 2.0, 175.0, 0.0, 0.8, 2.0, 0.0, 2.0]
        );
    }

    #[test]
    fn test_moderate_symptom_bucket() {
        // cp=1, breathing=1, fatigue=1 -> count 3
        let encoded =
            HeartEncoder.encode(&input("rarely", "mild", "sometimes", "normal", "30_50", "monthly"));
        let f = encoded.features.as_slice();
        assert_eq!(f[3], 138.0);
        assert_eq!(f[4], 265.0);
        assert_eq!(f[5], 0.0);
        assert_eq!(f[6], 0.0);
        assert_eq!(f[7], 150.0);
        assert_eq!(f[8], 0.0);
        assert_eq!(f[9], 1.2);
        assert_eq!(f[10], 1.0);
        assert_eq!(f[11], 0.0);
        assert_eq!(f[12], 2.0);
    }

    #[test]
    fn test_unknown_heart_rate_and_exercise_use_neutral_levels() {
        let encoded = HeartEncoder.encode(&input("never", "no", "never", "racing", "??", "sometimes"));
        let f = encoded.features.as_slice();
        assert_eq!(f[0], 50.0);
        assert_eq!(f[7], 140.0);
        assert_eq!(f[8], 0.0);
        assert_eq!(encoded.degraded.len(), 3);
    }
}
