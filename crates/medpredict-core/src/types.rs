//! Core types for MedPredict

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prediction domain served by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Diabetes,
    Heart,
    Parkinsons,
    /// Shared-symptom (common disease) domain, served by two arbitrated models
    Common,
}

impl Domain {
    /// Feature count for domains with a fixed schema.
    ///
    /// The common domain is sized by the external symptom-name table and
    /// therefore returns `None`.
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            Self::Diabetes => Some(8),
            Self::Heart => Some(13),
            Self::Parkinsons => Some(22),
            Self::Common => None,
        }
    }

    /// Stable lowercase name, used for metric labels and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Heart => "heart",
            Self::Parkinsons => "parkinsons",
            Self::Common => "common",
        }
    }

    /// Human readable name used in client-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::Heart => "Heart",
            Self::Parkinsons => "Parkinsons",
            Self::Common => "Common disease",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered numeric input for a single inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a feature vector from raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create an all-zero vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no features
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the values
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Set a single position
    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Which derivation tier produced a confidence value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Max class probability reported by the artifact
    Probability,
    /// Clamped transform of a decision margin
    Margin,
    /// Fixed value chosen from the predicted label
    StaticDefault,
    /// Max component of a probability-like output activation vector
    OutputVector,
}

/// Final result of a prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Symbolic label
    pub label: String,

    /// Confidence in percent (0.0-100.0)
    pub confidence: f64,

    /// Tier that produced the confidence
    pub provenance: ConfidenceTier,

    /// Model that produced the label, when more than one was consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl PredictionResult {
    /// Create a new prediction result
    pub fn new(label: impl Into<String>, confidence: f64, provenance: ConfidenceTier) -> Self {
        Self {
            label: label.into(),
            confidence,
            provenance,
            model_used: None,
        }
    }

    /// Attach the name of the model that produced this result
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }
}
