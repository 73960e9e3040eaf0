//! Shared application state

use crate::config::ServerConfig;
use medpredict_models::{ModelRegistry, ModelsConfig, SharedRegistry};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Loaded models, read-only after startup
    pub registry: SharedRegistry,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServerConfig, registry: ModelRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: SharedRegistry::new(registry),
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Load every configured artifact and build the state.
    ///
    /// Any missing or unreadable artifact is an error, so the service never
    /// starts with a partial registry.
    pub fn initialize(config: ServerConfig, models: &ModelsConfig) -> medpredict_core::Result<Self> {
        info!("Loading models from base dir {}", models.base_dir.display());
        let registry = ModelRegistry::load_required(models)?;
        info!("Loaded {} models", registry.loaded_count());

        if config.uses_default_api_key() {
            warn!("MODEL_API_KEY is not set, using the placeholder key");
        }

        Ok(Self::new(config, registry))
    }
}
