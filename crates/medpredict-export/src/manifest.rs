//! Export manifest
//!
//! One JSON document per batch run describing what happened to every
//! requested key. Written as `models_manifest.json` next to the exported
//! artifacts.

use chrono::{DateTime, Utc};
use medpredict_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Manifest file name inside the output directory
pub const MANIFEST_FILE: &str = "models_manifest.json";

/// Outcome of exporting one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Success,
    Skipped,
    Failed,
}

/// Per-key manifest record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    pub file: Option<String>,
    pub n_features: Option<usize>,
    pub status: ExportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ManifestEntry {
    pub fn success(key: impl Into<String>, file: impl Into<String>, n_features: usize) -> Self {
        Self {
            key: key.into(),
            file: Some(file.into()),
            n_features: Some(n_features),
            status: ExportStatus::Success,
            reason: None,
        }
    }

    pub fn skipped(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            file: None,
            n_features: None,
            status: ExportStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            file: None,
            n_features: None,
            status: ExportStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExportStatus::Success
    }
}

/// Auxiliary files present at export time, relative to the base directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_columns: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub total_models: usize,
    pub successful_exports: usize,
    pub metadata: ManifestMetadata,
    pub models: Vec<ManifestEntry>,
}

impl ExportManifest {
    /// Build a manifest from the entries of one run
    pub fn new(models: Vec<ManifestEntry>, metadata: ManifestMetadata) -> Self {
        Self {
            generated_at: Utc::now(),
            total_models: models.len(),
            successful_exports: models.iter().filter(|m| m.is_success()).count(),
            metadata,
            models,
        }
    }

    /// Number of entries with the given status
    pub fn count(&self, status: ExportStatus) -> usize {
        self.models.iter().filter(|m| m.status == status).count()
    }

    /// Write as pretty JSON into `out_dir`, returning the file path
    pub fn write(&self, out_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| {
            Error::internal(format!("Failed to write manifest {}: {}", path.display(), e))
        })?;

        info!(
            "Wrote manifest with {}/{} successful exports -> {}",
            self.successful_exports,
            self.total_models,
            path.display()
        );
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
