//! Model registry initialization and management
//!
//! The registry is populated once at startup and is read-only afterwards.
//! Serving wraps it in an [`Arc`] and shares it across request handlers.

use crate::artifact::ModelArtifact;
use crate::auxiliary::{LabelEncoder, SymptomTable};
use crate::config::{ModelsConfig, ENCODER_KEY, SYMPTOM_COLUMNS_KEY};
use medpredict_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of loading one catalog entry
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Loaded(Arc<ModelArtifact>),
    Failed(String),
}

/// Registry of loaded model artifacts keyed by name
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    label_encoder: Option<Arc<LabelEncoder>>,
    symptom_table: Option<Arc<SymptomTable>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an artifact file and bind it to `key`.
    ///
    /// The outcome is recorded either way, so [`status`](Self::status)
    /// reports the key even when loading failed.
    pub fn load(&mut self, key: &str, path: impl AsRef<Path>) -> Result<Arc<ModelArtifact>> {
        let result = ModelArtifact::open(key, path.as_ref()).and_then(|artifact| {
            if artifact.arity().is_none() {
                return Err(Error::ArityUnknown {
                    key: key.to_string(),
                });
            }
            Ok(Arc::new(artifact))
        });

        match &result {
            Ok(artifact) => {
                self.entries
                    .insert(key.to_string(), RegistryEntry::Loaded(Arc::clone(artifact)));
            }
            Err(e) => {
                self.entries
                    .insert(key.to_string(), RegistryEntry::Failed(e.to_string()));
            }
        }

        result
    }

    /// Register an already-opened artifact
    pub fn register(&mut self, key: impl Into<String>, artifact: ModelArtifact) {
        self.entries
            .insert(key.into(), RegistryEntry::Loaded(Arc::new(artifact)));
    }

    /// Get a loaded artifact
    pub fn get(&self, key: &str) -> Option<Arc<ModelArtifact>> {
        match self.entries.get(key) {
            Some(RegistryEntry::Loaded(artifact)) => Some(Arc::clone(artifact)),
            _ => None,
        }
    }

    /// Check if a model is loaded
    pub fn has_model(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Load error recorded for a key, if any
    pub fn load_error(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(RegistryEntry::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    /// Keys of all successfully loaded models
    pub fn model_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, RegistryEntry::Loaded(_)))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Load the common-domain label encoder
    pub fn load_label_encoder(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.label_encoder = Some(Arc::new(LabelEncoder::from_file(path)?));
        Ok(())
    }

    /// Load the common-domain symptom-name table
    pub fn load_symptom_table(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.symptom_table = Some(Arc::new(SymptomTable::from_file(path)?));
        Ok(())
    }

    pub fn set_label_encoder(&mut self, encoder: LabelEncoder) {
        self.label_encoder = Some(Arc::new(encoder));
    }

    pub fn set_symptom_table(&mut self, table: SymptomTable) {
        self.symptom_table = Some(Arc::new(table));
    }

    pub fn label_encoder(&self) -> Option<Arc<LabelEncoder>> {
        self.label_encoder.clone()
    }

    pub fn symptom_table(&self) -> Option<Arc<SymptomTable>> {
        self.symptom_table.clone()
    }

    /// Availability of every key plus the auxiliary artifacts
    pub fn status(&self) -> BTreeMap<String, bool> {
        let mut status: BTreeMap<String, bool> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), matches!(entry, RegistryEntry::Loaded(_))))
            .collect();
        status.insert(ENCODER_KEY.to_string(), self.label_encoder.is_some());
        status.insert(SYMPTOM_COLUMNS_KEY.to_string(), self.symptom_table.is_some());
        status
    }

    /// Number of loaded models
    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, RegistryEntry::Loaded(_)))
            .count()
    }

    /// Load every catalog entry, failing on the first error.
    ///
    /// Auxiliary files are required only when the catalog has common-domain
    /// models.
    pub fn load_required(config: &ModelsConfig) -> Result<Self> {
        let mut registry = Self::new();

        info!("Loading model registry with {} models", config.models.len());

        for (key, spec) in &config.models {
            let path = config.resolve(&spec.path);
            registry.load(key, &path)?;
            info!(key = %key, path = %path.display(), "Loaded model");
        }

        if config.has_common_models() {
            let encoder = config
                .encoder_path()
                .ok_or_else(|| Error::config("common models configured without a label encoder"))?;
            registry.load_label_encoder(&encoder)?;

            let table = config.symptom_columns_path().ok_or_else(|| {
                Error::config("common models configured without a symptom column table")
            })?;
            registry.load_symptom_table(&table)?;
        }

        info!("Model registry initialized with {} models", registry.loaded_count());

        Ok(registry)
    }

    /// Load every catalog entry, recording failures instead of aborting
    pub fn load_isolated(config: &ModelsConfig) -> Self {
        let mut registry = Self::new();

        info!("Loading model registry with {} models", config.models.len());

        for (key, spec) in &config.models {
            let path = config.resolve(&spec.path);
            match registry.load(key, &path) {
                Ok(_) => info!("✓ Loaded model: {}", key),
                Err(e) => warn!("✗ Failed to load model {}: {}", key, e),
            }
        }

        if let Some(path) = config.encoder_path() {
            if let Err(e) = registry.load_label_encoder(&path) {
                warn!("✗ Failed to load label encoder: {}", e);
            }
        }
        if let Some(path) = config.symptom_columns_path() {
            if let Err(e) = registry.load_symptom_table(&path) {
                warn!("✗ Failed to load symptom columns: {}", e);
            }
        }

        info!(
            "Model registry initialized with {}/{} models",
            registry.loaded_count(),
            config.models.len()
        );

        registry
    }
}

/// Shared model registry for application-wide use
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    registry: Arc<ModelRegistry>,
}

impl SharedRegistry {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Get reference to the registry
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Clone the Arc for sharing across threads
    pub fn clone_arc(&self) -> Arc<ModelRegistry> {
        Arc::clone(&self.registry)
    }
}

impl std::ops::Deref for SharedRegistry {
    type Target = ModelRegistry;

    fn deref(&self) -> &ModelRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSpec;
    use medpredict_core::Domain;
    use tempfile::TempDir;

    const SVC: &str = r#"{"kind":"linear_svc","classes":[0,1],"coef":[[1.0,1.0]],"intercept":[0.0]}"#;

    #[test]
    fn test_load_records_success_and_failure() {
        let dir = TempDir::new().unwrap();
        let ok = dir.path().join("ok.json");
        std::fs::write(&ok, SVC).unwrap();

        let mut registry = ModelRegistry::new();
        assert!(registry.load("heart", &ok).is_ok());
        let err = registry
            .load("diabetes", dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));

        assert!(registry.has_model("heart"));
        assert!(registry.get("diabetes").is_none());
        assert!(registry.load_error("diabetes").unwrap().contains("not found"));
        assert_eq!(registry.model_names(), vec!["heart"]);

        let status = registry.status();
        assert_eq!(status["heart"], true);
        assert_eq!(status["diabetes"], false);
        assert_eq!(status[ENCODER_KEY], false);
        assert_eq!(status[SYMPTOM_COLUMNS_KEY], false);
    }

    #[test]
    fn test_unknown_arity_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(
            &path,
            r#"{"kind":"linear_svc","classes":[0,1],"coef":[[]],"intercept":[0.0]}"#,
        )
        .unwrap();

        let mut registry = ModelRegistry::new();
        assert!(matches!(
            registry.load("heart", &path),
            Err(Error::ArityUnknown { .. })
        ));
    }

    #[test]
    fn test_required_fails_fast_isolated_continues() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("heart.json"), SVC).unwrap();

        let config = ModelsConfig {
            base_dir: dir.path().to_path_buf(),
            models: [
                ("heart".to_string(), ModelSpec::new("heart.json", Domain::Heart)),
                ("diabetes".to_string(), ModelSpec::new("diabetes.json", Domain::Diabetes)),
            ]
            .into_iter()
            .collect(),
            auxiliary: Default::default(),
        };

        assert!(ModelRegistry::load_required(&config).is_err());

        let registry = ModelRegistry::load_isolated(&config);
        assert!(registry.has_model("heart"));
        assert!(!registry.has_model("diabetes"));
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn test_register_prebuilt_parts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("svc.json");
        std::fs::write(&path, SVC).unwrap();

        let mut registry = ModelRegistry::new();
        registry.register("heart", ModelArtifact::open("heart", &path).unwrap());
        registry.set_label_encoder(LabelEncoder::new(vec!["Flu".into(), "Migraine".into()]));
        registry.set_symptom_table(SymptomTable::new(vec!["cough".into(), "fever".into()]));

        assert_eq!(registry.get("heart").unwrap().input_width(), Some(2));
        assert_eq!(registry.label_encoder().unwrap().inverse(1), Some("Migraine"));
        assert_eq!(registry.symptom_table().unwrap().len(), 2);
        assert!(registry.status().values().all(|loaded| *loaded));
    }

    #[test]
    fn test_shared_registry_clones_share_state() {
        let shared = SharedRegistry::new(ModelRegistry::new());
        let other = shared.clone();
        assert!(Arc::ptr_eq(shared.registry(), &other.clone_arc()));
        assert_eq!(other.loaded_count(), 0);
    }
}
