//! Single-model risk prediction for the fixed-schema domains

use crate::artifact::ModelArtifact;
use crate::confidence;
use medpredict_core::{FeatureVector, PredictionResult, Result};

pub const HIGH_RISK_LABEL: &str = "High Risk";
pub const LOW_RISK_LABEL: &str = "Low Risk";

/// Outcome of a binary risk prediction
#[derive(Debug, Clone)]
pub struct RiskPrediction {
    pub result: PredictionResult,
    pub high_risk: bool,
}

impl RiskPrediction {
    /// Lowercase risk level, `"high"` or `"low"`
    pub fn risk_level(&self) -> &'static str {
        if self.high_risk {
            "high"
        } else {
            "low"
        }
    }
}

/// Evaluate a binary artifact and label the outcome
pub fn predict_risk(artifact: &ModelArtifact, features: &FeatureVector) -> Result<RiskPrediction> {
    let output = artifact.infer(features)?;
    let confidence = confidence::resolve(artifact.capabilities(), &output);
    let high_risk = output.is_positive();
    let label = if high_risk {
        HIGH_RISK_LABEL
    } else {
        LOW_RISK_LABEL
    };

    Ok(RiskPrediction {
        result: PredictionResult::new(label, confidence.value, confidence.tier),
        high_risk,
    })
}
