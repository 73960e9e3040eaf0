//! Server configuration

use medpredict_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Key accepted when none is configured
pub const DEFAULT_API_KEY: &str = "changeme";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Value expected in the `x-api-key` header of prediction requests
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Debug logging
    #[serde(default)]
    pub debug: bool,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Models catalog (YAML); the built-in catalog is used when unset
    #[serde(default)]
    pub models_config: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from a YAML file, or use defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid server config {}: {}", path.display(), e)))
    }

    /// Socket address built from host and port
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::config(format!("invalid listen address: {}", e)))
    }

    /// Whether the API key was left at its placeholder value
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: default_api_key(),
            debug: false,
            allowed_origins: default_allowed_origins(),
            models_config: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://health-predictor-v2.vercel.app".to_string(),
    ]
}
