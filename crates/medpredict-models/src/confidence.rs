//! Tiered confidence resolution
//!
//! Turns one artifact's [`RawOutput`] into a percentage in `[0, 100]`:
//!
//! 1. **Probability**: `100 × max class probability`
//! 2. **Margin**: `p = 1 / (1 + |s|)` (or `0.5` when `s == 0`), clamped to
//!    `[0.6, 0.95]`, times 100
//! 3. **Static default**: 85 for the positive class, 75 otherwise
//!
//! A tier is only attempted when the artifact's capabilities say it applies.
//! If an attempted tier cannot produce a value, the resolver falls through to
//! the next one.

use crate::artifact::{Capabilities, RawOutput};
use medpredict_core::{ConfidenceTier, Error, Result};
use tracing::debug;

/// Static confidence when the positive class is predicted
pub const POSITIVE_DEFAULT: f64 = 85.0;

/// Static confidence for any other class
pub const NEGATIVE_DEFAULT: f64 = 75.0;

const MARGIN_FLOOR: f64 = 0.6;
const MARGIN_CEILING: f64 = 0.95;

/// Resolved confidence and the tier it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence {
    pub value: f64,
    pub tier: ConfidenceTier,
}

impl Confidence {
    fn new(value: f64, tier: ConfidenceTier) -> Self {
        Self {
            value: value.clamp(0.0, 100.0),
            tier,
        }
    }
}

/// Resolve confidence for one artifact output
pub fn resolve(capabilities: Capabilities, output: &RawOutput) -> Confidence {
    for tier in capabilities.tiers() {
        let attempt = match tier {
            ConfidenceTier::Probability => from_probabilities(output),
            ConfidenceTier::Margin => from_margin(output),
            ConfidenceTier::OutputVector => from_output_vector(output),
            ConfidenceTier::StaticDefault => Ok(static_default(output)),
        };

        match attempt {
            Ok(value) => return Confidence::new(value, tier),
            Err(e) => debug!(tier = ?tier, error = %e, "Confidence tier unavailable, falling through"),
        }
    }

    Confidence::new(static_default(output), ConfidenceTier::StaticDefault)
}

/// Tier 1: maximum class probability
pub fn from_probabilities(output: &RawOutput) -> Result<f64> {
    let probabilities = output
        .probabilities
        .as_deref()
        .ok_or_else(|| Error::capability("artifact reported no probabilities"))?;
    max_finite(probabilities)
        .map(|p| 100.0 * p.clamp(0.0, 1.0))
        .ok_or_else(|| Error::capability("probability vector is empty"))
}

/// Tier 2: clamped transform of the decision margin
pub fn from_margin(output: &RawOutput) -> Result<f64> {
    let margin = output
        .margin
        .ok_or_else(|| Error::capability("artifact reported no single decision margin"))?;
    if !margin.is_finite() {
        return Err(Error::capability(format!("non-finite margin {}", margin)));
    }
    Ok(margin_confidence(margin))
}

/// Map a signed margin to a percentage
pub fn margin_confidence(margin: f64) -> f64 {
    let p = if margin != 0.0 {
        1.0 / (1.0 + margin.abs())
    } else {
        0.5
    };
    100.0 * p.clamp(MARGIN_FLOOR, MARGIN_CEILING)
}

/// Tier 3: fixed value chosen by the predicted class
pub fn static_default(output: &RawOutput) -> f64 {
    if output.is_positive() {
        POSITIVE_DEFAULT
    } else {
        NEGATIVE_DEFAULT
    }
}

/// Network outputs: `100 × max activation`
pub fn from_output_vector(output: &RawOutput) -> Result<f64> {
    let activations = output
        .activations
        .as_deref()
        .ok_or_else(|| Error::capability("artifact reported no output activations"))?;
    max_finite(activations)
        .map(|a| (100.0 * a).clamp(0.0, 100.0))
        .ok_or_else(|| Error::capability("output activation vector is empty"))
}

/// Confidence for an artifact that emits an activation vector, falling back
/// to the regular tiers when it does not.
pub fn resolve_output_vector(capabilities: Capabilities, output: &RawOutput) -> Confidence {
    match from_output_vector(output) {
        Ok(value) => Confidence::new(value, ConfidenceTier::OutputVector),
        Err(e) => {
            debug!(error = %e, "No output vector, using standard confidence tiers");
            resolve(capabilities, output)
        }
    }
}

fn max_finite(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(f64::max)
}
