//! Native JSON artifact documents
//!
//! Training writes one document per model:
//!
//! ```json
//! {
//!   "kind": "logistic_regression",
//!   "n_features_in": 8,
//!   "classes": [0, 1],
//!   "coef": [[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]],
//!   "intercept": [-1.5]
//! }
//! ```

use crate::artifact::{ArtifactFormat, ArtifactKind, Estimator, ModelArtifact};
use crate::centroid::NearestCentroid;
use crate::linear::LinearModel;
use crate::neural::{Activation, SequentialNet};
use medpredict_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parsed native artifact document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactDocument {
    LogisticRegression(LinearParams),
    LinearSvc(LinearParams),
    NearestCentroid(CentroidParams),
    Sequential(SequentialParams),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
    pub classes: Vec<i64>,
    pub centroids: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<i64>>,
    pub layers: Vec<DenseParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseParams {
    /// `[units][inputs]`
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl ArtifactDocument {
    /// Read and parse a document from disk
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
        serde_json::from_str(&content).map_err(|e| Error::load(path, e))
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::LogisticRegression(_) => ArtifactKind::LogisticRegression,
            Self::LinearSvc(_) => ArtifactKind::LinearSvc,
            Self::NearestCentroid(_) => ArtifactKind::NearestCentroid,
            Self::Sequential(_) => ArtifactKind::Sequential,
        }
    }

    /// Build the evaluable artifact. Parameter errors surface as load errors.
    pub fn into_artifact(self, key: &str, path: &Path) -> Result<ModelArtifact> {
        let kind = self.kind();
        let (declared_arity, estimator) = match self {
            Self::LogisticRegression(p) | Self::LinearSvc(p) => {
                let probabilistic = kind.capabilities().probability;
                let model = LinearModel::new(p.coef, p.intercept, p.classes, probabilistic);
                (p.n_features_in, model.map(Estimator::Linear))
            }
            Self::NearestCentroid(p) => (
                p.n_features_in,
                NearestCentroid::new(p.centroids, p.classes).map(Estimator::Centroid),
            ),
            Self::Sequential(p) => {
                let layers = p
                    .layers
                    .into_iter()
                    .map(|layer| (layer.weights, layer.bias, layer.activation))
                    .collect();
                (
                    p.n_features_in,
                    SequentialNet::new(layers, p.classes).map(Estimator::Sequential),
                )
            }
        };
        let estimator = estimator.map_err(|e| Error::load(path, e))?;

        Ok(ModelArtifact::new(
            key,
            kind,
            ArtifactFormat::Native,
            declared_arity,
            path.to_path_buf(),
            estimator,
        ))
    }
}
