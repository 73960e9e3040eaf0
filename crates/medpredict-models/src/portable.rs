//! Portable artifact format
//!
//! A safetensors container holding the estimator parameters plus string
//! metadata. Linear models store `weight`, `bias` and `classes`; nearest
//! centroid models store `centroids` and `classes`.
//!
//! Metadata keys: `format`, `kind`, `n_features`, `source_key`.

use crate::artifact::{tensor_error, ArtifactFormat, ArtifactKind, Estimator, ModelArtifact};
use crate::centroid::NearestCentroid;
use crate::linear::LinearModel;
use candle_core::{DType, Device, Tensor};
use medpredict_core::{Error, Result};
use safetensors::SafeTensors;
use std::collections::HashMap;
use std::path::Path;

/// Format marker written into every portable container
pub const PORTABLE_FORMAT: &str = "medpredict-portable/1";

/// Serialize an artifact's estimator to `path`
pub(crate) fn write(
    artifact: &ModelArtifact,
    estimator: &Estimator,
    n_features: usize,
    path: &Path,
) -> Result<()> {
    let device = Device::Cpu;
    let tensors: Vec<(&str, Tensor)> = match estimator {
        Estimator::Linear(model) => {
            let bias = model
                .bias()
                .cloned()
                .ok_or_else(|| Error::model("linear model has no bias"))?;
            vec![
                ("weight", model.weight().clone()),
                ("bias", bias),
                ("classes", classes_tensor(model.classes(), &device)?),
            ]
        }
        Estimator::Centroid(model) => {
            let rows = model.centroids().len();
            let width = model.width().unwrap_or(0);
            let centroids = Tensor::from_vec(model.centroids().concat(), (rows, width), &device)
                .map_err(tensor_error)?;
            vec![
                ("centroids", centroids),
                ("classes", classes_tensor(model.classes(), &device)?),
            ]
        }
        Estimator::Sequential(_) => {
            return Err(Error::UnsupportedArtifactKind {
                key: artifact.key().to_string(),
                kind: artifact.kind().to_string(),
            });
        }
    };

    let metadata = HashMap::from([
        ("format".to_string(), PORTABLE_FORMAT.to_string()),
        ("kind".to_string(), artifact.kind().as_str().to_string()),
        ("n_features".to_string(), n_features.to_string()),
        ("source_key".to_string(), artifact.key().to_string()),
    ]);

    safetensors::serialize_to_file(tensors, &Some(metadata), path)
        .map_err(|e| Error::model(format!("Failed to write portable artifact: {}", e)))
}

/// Read a portable artifact
pub(crate) fn read(key: &str, path: &Path) -> Result<ModelArtifact> {
    let buffer = std::fs::read(path).map_err(|e| Error::load(path, e))?;

    let (_, header) = SafeTensors::read_metadata(&buffer).map_err(|e| Error::load(path, e))?;
    let metadata = header.metadata().clone().unwrap_or_default();

    if metadata.get("format").map(String::as_str) != Some(PORTABLE_FORMAT) {
        return Err(Error::load(path, "missing portable format marker"));
    }

    let kind = metadata
        .get("kind")
        .and_then(|tag| ArtifactKind::from_tag(tag))
        .ok_or_else(|| Error::load(path, "missing or unknown artifact kind"))?;

    let n_features = metadata
        .get("n_features")
        .map(|n| n.parse::<usize>())
        .transpose()
        .map_err(|e| Error::load(path, format!("invalid n_features: {}", e)))?;

    let mut tensors = candle_core::safetensors::load_buffer(&buffer, &Device::Cpu)
        .map_err(|e| Error::load(path, e))?;
    let mut take = |name: &str| {
        tensors
            .remove(name)
            .ok_or_else(|| Error::load(path, format!("missing tensor '{}'", name)))
    };

    let classes = take("classes")?
        .to_dtype(DType::I64)
        .and_then(|t| t.to_vec1::<i64>())
        .map_err(|e| Error::load(path, e))?;

    let estimator = match kind {
        ArtifactKind::LogisticRegression | ArtifactKind::LinearSvc => {
            let weight = take("weight")?;
            let bias = take("bias")?;
            LinearModel::from_tensors(weight, bias, classes, kind.capabilities().probability)
                .map(Estimator::Linear)
        }
        ArtifactKind::NearestCentroid => take("centroids")?
            .to_dtype(DType::F64)
            .and_then(|t| t.to_vec2::<f64>())
            .map_err(tensor_error)
            .and_then(|centroids| NearestCentroid::new(centroids, classes))
            .map(Estimator::Centroid),
        ArtifactKind::Sequential => {
            return Err(Error::load(path, "portable containers never hold sequential networks"));
        }
    }
    .map_err(|e| Error::load(path, e))?;

    Ok(ModelArtifact::new(
        key,
        kind,
        ArtifactFormat::Portable,
        n_features,
        path.to_path_buf(),
        estimator,
    ))
}

/// Read only the metadata map of a portable container
pub fn read_metadata(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let buffer = std::fs::read(path).map_err(|e| Error::load(path, e))?;
    let (_, header) = SafeTensors::read_metadata(&buffer).map_err(|e| Error::load(path, e))?;
    Ok(header.metadata().clone().unwrap_or_default())
}

fn classes_tensor(classes: &[i64], device: &Device) -> Result<Tensor> {
    Tensor::new(classes, device).map_err(tensor_error)
}
