//! Trained model artifacts
//!
//! A [`ModelArtifact`] wraps one evaluable estimator together with the facts
//! the rest of the system needs about it: its kind, which inference
//! capabilities it exposes, the file format it was read from, and the input
//! arity it declares for itself.
//!
//! Capabilities are derived once from the artifact kind at load time. The
//! confidence resolver only pattern-matches on them; nothing inspects the
//! estimator at request time to find out what it can do.

use crate::centroid::NearestCentroid;
use crate::linear::LinearModel;
use crate::native::ArtifactDocument;
use crate::neural::SequentialNet;
use crate::portable;
use medpredict_core::{ConfidenceTier, Error, FeatureVector, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Class value treated as the positive (high risk) outcome
pub const POSITIVE_CLASS: i64 = 1;

/// Kind of estimator stored in an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Linear model with a logistic link; exposes probabilities and margins
    LogisticRegression,
    /// Linear support vector classifier; exposes margins only
    LinearSvc,
    /// Distance-based classifier; exposes neither
    NearestCentroid,
    /// Dense network from a deep-learning runtime; emits an activation vector
    Sequential,
}

/// Runtime family an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRuntime {
    /// Classical estimator, convertible to the portable format
    Classical,
    /// Deep-learning runtime artifact, never convertible
    DeepLearning,
}

impl ArtifactKind {
    /// Tag used in native documents and portable metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogisticRegression => "logistic_regression",
            Self::LinearSvc => "linear_svc",
            Self::NearestCentroid => "nearest_centroid",
            Self::Sequential => "sequential",
        }
    }

    /// Parse a kind tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "logistic_regression" => Some(Self::LogisticRegression),
            "linear_svc" => Some(Self::LinearSvc),
            "nearest_centroid" => Some(Self::NearestCentroid),
            "sequential" => Some(Self::Sequential),
            _ => None,
        }
    }

    pub fn runtime(&self) -> ArtifactRuntime {
        match self {
            Self::Sequential => ArtifactRuntime::DeepLearning,
            _ => ArtifactRuntime::Classical,
        }
    }

    /// Whether the export pipeline can rewrite this kind in portable form
    pub fn is_convertible(&self) -> bool {
        self.runtime() == ArtifactRuntime::Classical
    }

    /// Inference capabilities exposed by this kind
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::LogisticRegression => Capabilities {
                probability: true,
                margin: true,
            },
            Self::LinearSvc => Capabilities {
                probability: false,
                margin: true,
            },
            Self::NearestCentroid | Self::Sequential => Capabilities::default(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence-relevant capabilities of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Reports per-class probabilities
    pub probability: bool,
    /// Reports a signed decision margin
    pub margin: bool,
}

impl Capabilities {
    /// Resolver tiers applicable to this artifact, in priority order.
    ///
    /// Always ends with [`ConfidenceTier::StaticDefault`].
    pub fn tiers(self) -> impl Iterator<Item = ConfidenceTier> {
        [
            (self.probability, ConfidenceTier::Probability),
            (self.margin, ConfidenceTier::Margin),
            (true, ConfidenceTier::StaticDefault),
        ]
        .into_iter()
        .filter_map(|(enabled, tier)| enabled.then_some(tier))
    }
}

/// On-disk artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// JSON parameter document as produced by training
    Native,
    /// safetensors container written by the export pipeline
    Portable,
}

impl ArtifactFormat {
    /// Select the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Native),
            Some(ext) if ext.eq_ignore_ascii_case("safetensors") => Ok(Self::Portable),
            other => Err(Error::load(
                path,
                format!("unrecognized artifact extension {:?}", other.unwrap_or("")),
            )),
        }
    }

    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Native => "json",
            Self::Portable => "safetensors",
        }
    }
}

/// Everything one forward pass produced
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutput {
    /// Predicted class value
    pub class: i64,
    /// Per-class probabilities, when the artifact reports them
    pub probabilities: Option<Vec<f64>>,
    /// Signed decision margin, when the artifact reports a single one
    pub margin: Option<f64>,
    /// Raw output activations of a network artifact
    pub activations: Option<Vec<f64>>,
}

impl RawOutput {
    /// Output carrying only a class value
    pub fn class_only(class: i64) -> Self {
        Self {
            class,
            probabilities: None,
            margin: None,
            activations: None,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.class == POSITIVE_CLASS
    }
}

/// Evaluable estimator behind an artifact
#[derive(Debug, Clone)]
pub(crate) enum Estimator {
    Linear(LinearModel),
    Centroid(NearestCentroid),
    Sequential(SequentialNet),
}

impl Estimator {
    fn input_width(&self) -> Option<usize> {
        match self {
            Self::Linear(model) => model.width(),
            Self::Centroid(model) => model.width(),
            Self::Sequential(net) => net.width(),
        }
    }

    fn forward(&self, features: &[f64]) -> Result<RawOutput> {
        match self {
            Self::Linear(model) => model.forward(features),
            Self::Centroid(model) => Ok(model.forward(features)),
            Self::Sequential(net) => net.forward(features),
        }
    }
}

/// A loaded, immutable model artifact
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    key: String,
    kind: ArtifactKind,
    capabilities: Capabilities,
    format: ArtifactFormat,
    declared_arity: Option<usize>,
    source: PathBuf,
    estimator: Estimator,
}

impl ModelArtifact {
    pub(crate) fn new(
        key: impl Into<String>,
        kind: ArtifactKind,
        format: ArtifactFormat,
        declared_arity: Option<usize>,
        source: PathBuf,
        estimator: Estimator,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            capabilities: kind.capabilities(),
            format,
            declared_arity,
            source,
            estimator,
        }
    }

    /// Open an artifact file, choosing the format by extension
    pub fn open(key: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::missing(key, path));
        }

        let artifact = match ArtifactFormat::from_path(path)? {
            ArtifactFormat::Native => ArtifactDocument::read(path)?.into_artifact(key, path)?,
            ArtifactFormat::Portable => portable::read(key, path)?,
        };
        artifact.check_declared_arity()?;

        debug!(
            key = %key,
            kind = %artifact.kind,
            format = ?artifact.format,
            arity = ?artifact.arity(),
            "Opened model artifact"
        );

        Ok(artifact)
    }

    /// Registry key this artifact was loaded under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// Path the artifact was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Input arity the artifact declares about itself, if any
    pub fn declared_arity(&self) -> Option<usize> {
        self.declared_arity
    }

    /// Input width implied by the estimator's parameters
    pub fn input_width(&self) -> Option<usize> {
        self.estimator.input_width()
    }

    /// A declared arity must agree with the parameter width
    fn check_declared_arity(&self) -> Result<()> {
        match (self.declared_arity, self.input_width()) {
            (Some(declared), Some(width)) if declared != width => Err(Error::ArityMismatch {
                key: self.key.clone(),
                expected: declared,
                actual: width,
            }),
            _ => Ok(()),
        }
    }

    /// Effective input arity: the declared one, else the parameter width
    pub fn arity(&self) -> Option<usize> {
        self.declared_arity.or_else(|| self.input_width())
    }

    /// Evaluate one feature vector.
    ///
    /// Fails with [`Error::ArityMismatch`] when the vector length differs
    /// from the artifact's arity.
    pub fn infer(&self, features: &FeatureVector) -> Result<RawOutput> {
        let expected = self.arity().ok_or_else(|| Error::ArityUnknown {
            key: self.key.clone(),
        })?;

        if features.len() != expected {
            return Err(Error::ArityMismatch {
                key: self.key.clone(),
                expected,
                actual: features.len(),
            });
        }

        self.estimator.forward(features.as_slice())
    }

    /// Write this artifact in portable form.
    ///
    /// `arity` is recorded in the container metadata and must agree with the
    /// estimator's parameter width.
    pub fn write_portable(&self, arity: usize, path: impl AsRef<Path>) -> Result<()> {
        if !self.kind.is_convertible() {
            return Err(Error::UnsupportedArtifactKind {
                key: self.key.clone(),
                kind: self.kind.to_string(),
            });
        }

        if let Some(width) = self.input_width() {
            if width != arity {
                return Err(Error::ArityMismatch {
                    key: self.key.clone(),
                    expected: arity,
                    actual: width,
                });
            }
        }

        portable::write(self, &self.estimator, arity, path.as_ref())
    }
}

/// Convert a tensor error into a model error
pub(crate) fn tensor_error(e: candle_core::Error) -> Error {
    Error::model(format!("tensor evaluation failed: {}", e))
}

/// Index of the largest value; the first one wins on ties
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}
