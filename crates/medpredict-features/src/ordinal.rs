//! Ordinal vocabularies and degraded-input tracking

use medpredict_core::{Domain, FeatureVector};
use serde::Serialize;
use tracing::warn;

/// A fixed vocabulary of answers mapped to severity steps.
///
/// Lookups are case-insensitive and ignore surrounding whitespace. Several
/// spellings may share a step (e.g. `"no"` and `"none"`). A bare number is
/// accepted when it is one of the scale's steps.
#[derive(Debug, Clone, Copy)]
pub struct OrdinalScale {
    levels: &'static [(&'static str, u8)],
    sentinel: u8,
}

impl OrdinalScale {
    /// Create a scale with the lowest-severity sentinel of 0
    pub const fn new(levels: &'static [(&'static str, u8)]) -> Self {
        Self {
            levels,
            sentinel: 0,
        }
    }

    /// Override the value used for unrecognized answers
    pub const fn with_sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Look up an answer, returning `None` if it is not in the vocabulary
    pub fn lookup(&self, raw: &str) -> Option<u8> {
        let needle = raw.trim();
        self.levels
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(needle))
            .map(|(_, level)| *level)
            .or_else(|| {
                let step: u8 = needle.parse().ok()?;
                self.levels
                    .iter()
                    .any(|(_, level)| *level == step)
                    .then_some(step)
            })
    }

    /// Neutral value substituted for unrecognized answers
    pub fn sentinel(&self) -> u8 {
        self.sentinel
    }
}

/// A field whose raw answer was not recognized and was replaced by its sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedField {
    /// Request field name
    pub field: &'static str,

    /// Raw value as received
    pub value: String,
}

/// Output of an encoder: the feature vector plus any degraded fields
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Encoded features
    pub features: FeatureVector,

    /// Fields that fell back to their sentinel value
    pub degraded: Vec<DegradedField>,
}

impl Encoded {
    /// Whether any field fell back to its sentinel
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Reads ordinal answers for one request, recording every sentinel substitution
pub(crate) struct AnswerReader {
    domain: Domain,
    degraded: Vec<DegradedField>,
}

impl AnswerReader {
    pub(crate) fn new(domain: Domain) -> Self {
        Self {
            domain,
            degraded: Vec::new(),
        }
    }

    /// Resolve one answer against its scale
    pub(crate) fn level(&mut self, field: &'static str, scale: &OrdinalScale, raw: &str) -> u8 {
        match scale.lookup(raw) {
            Some(level) => level,
            None => {
                self.degraded.push(DegradedField {
                    field,
                    value: raw.to_string(),
                });
                scale.sentinel()
            }
        }
    }

    /// Finish reading and attach the collected degraded fields
    pub(crate) fn finish(self, features: Vec<f64>) -> Encoded {
        if !self.degraded.is_empty() {
            let fields: Vec<&str> = self.degraded.iter().map(|d| d.field).collect();
            warn!(
                domain = %self.domain,
                fields = ?fields,
                "Degraded input: unrecognized answers replaced with low-risk sentinels"
            );
        }

        Encoded {
            features: FeatureVector::new(features),
            degraded: self.degraded,
        }
    }
}
