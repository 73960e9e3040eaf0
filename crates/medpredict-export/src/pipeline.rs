//! Export pipeline
//!
//! Converts catalog entries to portable artifacts, one key at a time. Every
//! key ends in exactly one manifest entry; a failing key never stops the
//! batch.

use crate::manifest::{ExportManifest, ManifestEntry, ManifestMetadata};
use medpredict_core::{Error, Result};
use medpredict_models::{
    ArtifactFormat, ModelArtifact, ModelRegistry, ModelSpec, ModelsConfig, SymptomTable,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output directory used when none is given
pub const DEFAULT_OUT_DIR: &str = "web/models";

/// Reason recorded for keys missing from the catalog
pub const UNKNOWN_KEY_REASON: &str = "unknown model key";

/// Reason recorded for deep-learning runtime artifacts
pub const NOT_CONVERTIBLE_REASON: &str =
    "deep-learning runtime artifact (sequential) is not convertible";

/// Export runner bound to one catalog
pub struct Exporter {
    config: ModelsConfig,
}

impl Exporter {
    pub fn new(config: ModelsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelsConfig {
        &self.config
    }

    /// Output file name for a key
    pub fn file_name(key: &str) -> String {
        format!("{}.{}", key, ArtifactFormat::Portable.extension())
    }

    /// Load the requested keys with per-key isolation.
    ///
    /// Unknown keys are left out; the auxiliary files are loaded only when a
    /// requested key belongs to the common group.
    fn load_registry(&self, keys: &[String]) -> ModelRegistry {
        let models: BTreeMap<String, ModelSpec> = keys
            .iter()
            .filter_map(|key| {
                self.config
                    .model(key)
                    .map(|spec| (key.clone(), spec.clone()))
            })
            .collect();

        let mut subset = self.config.clone();
        if !models.values().any(ModelSpec::is_common) {
            subset.auxiliary = Default::default();
        }
        subset.models = models;

        ModelRegistry::load_isolated(&subset)
    }

    /// Export a single key to an explicit path. No manifest is written.
    pub fn export_one(&self, key: &str, out_path: &Path) -> ManifestEntry {
        let registry = self.load_registry(&[key.to_string()]);
        self.export_key(&registry, key, out_path)
    }

    /// Export several keys into `out_dir`
    pub fn export_many(&self, keys: &[String], out_dir: &Path) -> ExportManifest {
        info!("Exporting {} models to {}", keys.len(), out_dir.display());

        let registry = self.load_registry(keys);
        let entries = keys
            .iter()
            .map(|key| {
                let target = out_dir.join(Self::file_name(key));
                self.export_key(&registry, key, &target)
            })
            .collect();

        ExportManifest::new(entries, self.manifest_metadata())
    }

    /// Export every catalog key in sorted order
    pub fn export_all(&self, out_dir: &Path) -> ExportManifest {
        self.export_many(&self.config.model_keys(), out_dir)
    }

    fn export_key(&self, registry: &ModelRegistry, key: &str, target: &Path) -> ManifestEntry {
        let Some(spec) = self.config.model(key) else {
            warn!("Unknown model key '{}', recording as failed", key);
            return ManifestEntry::failed(key, UNKNOWN_KEY_REASON);
        };

        let Some(artifact) = registry.get(key) else {
            let reason = registry
                .load_error(key)
                .unwrap_or("artifact was not loaded")
                .to_string();
            warn!("Failed to export {}: {}", key, reason);
            return ManifestEntry::failed(key, reason);
        };

        if !artifact.kind().is_convertible() {
            info!("Skipping {}: {}", key, NOT_CONVERTIBLE_REASON);
            return ManifestEntry::skipped(key, NOT_CONVERTIBLE_REASON);
        }

        let symptom_table = registry.symptom_table();
        let result = discover_arity(key, spec, &artifact, symptom_table.as_deref())
            .and_then(|arity| convert(&artifact, arity, target).map(|_| arity));

        match result {
            Ok(arity) => {
                info!(
                    key = %key,
                    n_features = arity,
                    "Exported portable artifact to {}",
                    target.display()
                );
                let file = target
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| Self::file_name(key));
                ManifestEntry::success(key, file, arity)
            }
            Err(e) => {
                warn!("Failed to export {}: {}", key, e);
                ManifestEntry::failed(key, e.to_string())
            }
        }
    }

    /// Base-dir-relative paths of the auxiliary files that exist
    pub fn manifest_metadata(&self) -> ManifestMetadata {
        let relative = |path: Option<PathBuf>| {
            path.filter(|p| p.exists()).map(|p| {
                p.strip_prefix(&self.config.base_dir)
                    .unwrap_or(p.as_path())
                    .display()
                    .to_string()
            })
        };

        ManifestMetadata {
            encoder: relative(self.config.encoder_path()),
            symptom_columns: relative(self.config.symptom_columns_path()),
        }
    }
}

/// Work out the feature count for a key.
///
/// Order: symptom-table length for the common group, the artifact's own
/// declaration, then the static per-domain table.
pub fn discover_arity(
    key: &str,
    spec: &ModelSpec,
    artifact: &ModelArtifact,
    symptom_table: Option<&SymptomTable>,
) -> Result<usize> {
    if spec.is_common() {
        match symptom_table {
            Some(table) => return Ok(table.len()),
            None => debug!(key = %key, "Symptom table unavailable, trying other arity sources"),
        }
    }

    artifact
        .declared_arity()
        .or_else(|| spec.static_arity())
        .ok_or_else(|| Error::ArityUnknown {
            key: key.to_string(),
        })
}

fn convert(artifact: &ModelArtifact, arity: usize, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    artifact.write_portable(arity, target)
}
