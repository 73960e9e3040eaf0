//! Two-model arbitration for the common-disease domain
//!
//! The same feature vector is evaluated by a primary linear model and a
//! secondary network. The secondary's answer is used only when its
//! confidence is strictly higher; ties go to the primary.

use crate::artifact::{ModelArtifact, RawOutput};
use crate::auxiliary::LabelEncoder;
use crate::confidence::{self, Confidence};
use medpredict_core::{FeatureVector, PredictionResult, Result};
use tracing::debug;

/// Name reported when the primary model wins
pub const PRIMARY_MODEL: &str = "logistic";

/// Name reported when the secondary model wins
pub const SECONDARY_MODEL: &str = "neural";

/// One model's answer with its resolved confidence
#[derive(Debug, Clone)]
pub struct Candidate {
    pub model: &'static str,
    pub output: RawOutput,
    pub confidence: Confidence,
}

/// Pick the winning candidate; the secondary must be strictly more confident
pub fn select(primary: Candidate, secondary: Candidate) -> Candidate {
    if secondary.confidence.value > primary.confidence.value {
        secondary
    } else {
        primary
    }
}

/// Evaluate both models and decode the winner's class through the encoder
pub fn arbitrate(
    primary: &ModelArtifact,
    secondary: &ModelArtifact,
    encoder: &LabelEncoder,
    features: &FeatureVector,
) -> Result<PredictionResult> {
    let primary_output = primary.infer(features)?;
    let primary = Candidate {
        model: PRIMARY_MODEL,
        confidence: confidence::resolve(primary.capabilities(), &primary_output),
        output: primary_output,
    };

    let secondary_output = secondary.infer(features)?;
    let secondary = Candidate {
        model: SECONDARY_MODEL,
        confidence: confidence::resolve_output_vector(
            secondary.capabilities(),
            &secondary_output,
        ),
        output: secondary_output,
    };

    debug!(
        primary = primary.confidence.value,
        secondary = secondary.confidence.value,
        "Arbitrating common-domain prediction"
    );

    let winner = select(primary, secondary);
    let label = encoder.decode(winner.output.class)?;

    Ok(
        PredictionResult::new(label, winner.confidence.value, winner.confidence.tier)
            .with_model(winner.model),
    )
}
