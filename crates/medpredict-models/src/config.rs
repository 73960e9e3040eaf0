//! Model catalog configuration
//!
//! The catalog maps registry keys to artifact files and names the two
//! auxiliary files the common domain depends on:
//!
//! ```yaml
//! base_dir: /srv/medpredict
//! models:
//!   heart:
//!     path: "Datasets/sav files/heart_disease_model.json"
//!     domain: heart
//!   common_logistic:
//!     path: Datasets/pkl/logistic_regression_model.json
//!     domain: common
//! auxiliary:
//!   encoder: Datasets/pkl/encoder.json
//!   symptom_columns: Datasets/pkl/symptom_columns.json
//! ```
//!
//! Relative paths resolve against `base_dir`; a relative `base_dir` resolves
//! against the directory holding the config file.

use medpredict_core::{Domain, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Registry key of the primary (margin-capable) common-domain model
pub const COMMON_PRIMARY_KEY: &str = "common_logistic";

/// Registry key of the secondary (network) common-domain model
pub const COMMON_SECONDARY_KEY: &str = "common_neural";

/// Status key reported for the label encoder
pub const ENCODER_KEY: &str = "encoder";

/// Status key reported for the symptom-name table
pub const SYMPTOM_COLUMNS_KEY: &str = "symptom_columns";

/// Catalog of model artifacts and auxiliary files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Root for relative artifact paths
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Model specifications by registry key
    #[serde(default = "default_models")]
    pub models: BTreeMap<String, ModelSpec>,

    /// Auxiliary files for the common domain
    #[serde(default)]
    pub auxiliary: AuxiliarySpec,
}

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Artifact path, relative to `base_dir` unless absolute
    pub path: PathBuf,

    /// Domain the model serves
    pub domain: Domain,

    /// Overrides the domain's fixed feature count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl ModelSpec {
    pub fn new(path: impl Into<PathBuf>, domain: Domain) -> Self {
        Self {
            path: path.into(),
            domain,
            n_features: None,
        }
    }

    /// Whether this model is sized by the symptom-name table
    pub fn is_common(&self) -> bool {
        self.domain == Domain::Common
    }

    /// Feature count known without opening the artifact
    pub fn static_arity(&self) -> Option<usize> {
        self.n_features.or_else(|| self.domain.fixed_arity())
    }
}

/// Auxiliary file locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuxiliarySpec {
    /// Label encoder for common-domain class indices
    #[serde(default)]
    pub encoder: Option<PathBuf>,

    /// Ordered symptom-name table
    #[serde(default)]
    pub symptom_columns: Option<PathBuf>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_models() -> BTreeMap<String, ModelSpec> {
    [
        ("heart", "Datasets/sav files/heart_disease_model.json", Domain::Heart),
        ("diabetes", "Datasets/sav files/diabetes_model.json", Domain::Diabetes),
        ("parkinsons", "Datasets/sav files/parkinsons_model.json", Domain::Parkinsons),
        (
            COMMON_PRIMARY_KEY,
            "Datasets/pkl/logistic_regression_model.json",
            Domain::Common,
        ),
        (
            COMMON_SECONDARY_KEY,
            "Datasets/pkl/neural_network_model.json",
            Domain::Common,
        ),
    ]
    .into_iter()
    .map(|(key, path, domain)| (key.to_string(), ModelSpec::new(path, domain)))
    .collect()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            models: default_models(),
            auxiliary: AuxiliarySpec {
                encoder: Some(PathBuf::from("Datasets/pkl/encoder.json")),
                symptom_columns: Some(PathBuf::from("Datasets/pkl/symptom_columns.json")),
            },
        }
    }
}

impl ModelsConfig {
    /// Load a catalog from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read models config {}: {}", path.display(), e))
        })?;

        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse models config {}: {}", path.display(), e))
        })?;

        if config.base_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.base_dir = parent.join(&config.base_dir);
            }
        }

        Ok(config)
    }

    /// Load from `path` when given, else the built-in catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Replace the base directory
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Resolve a catalog path against `base_dir`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn model(&self, key: &str) -> Option<&ModelSpec> {
        self.models.get(key)
    }

    /// Resolved artifact path for a key
    pub fn model_path(&self, key: &str) -> Option<PathBuf> {
        self.models.get(key).map(|spec| self.resolve(&spec.path))
    }

    /// All model keys in catalog order
    pub fn model_keys(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn encoder_path(&self) -> Option<PathBuf> {
        self.auxiliary.encoder.as_deref().map(|p| self.resolve(p))
    }

    pub fn symptom_columns_path(&self) -> Option<PathBuf> {
        self.auxiliary
            .symptom_columns
            .as_deref()
            .map(|p| self.resolve(p))
    }

    /// Whether any configured model depends on the auxiliary files
    pub fn has_common_models(&self) -> bool {
        self.models.values().any(ModelSpec::is_common)
    }
}
