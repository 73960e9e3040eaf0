//! Error types for MedPredict

use std::path::PathBuf;

/// Result type alias using MedPredict's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MedPredict operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required model or auxiliary artifact file does not exist
    #[error("artifact '{key}' not found at {}", path.display())]
    MissingArtifact { key: String, path: PathBuf },

    /// Artifact exists but cannot be read or parsed
    #[error("failed to load artifact {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Artifact kind cannot be converted to the portable format
    #[error("artifact '{key}' of kind '{kind}' is not convertible")]
    UnsupportedArtifactKind { key: String, kind: String },

    /// Input arity could not be determined for an artifact
    #[error("cannot determine feature count for model '{key}'")]
    ArityUnknown { key: String },

    /// Feature vector length disagrees with the bound artifact
    #[error("feature arity mismatch for '{key}': expected {expected}, got {actual}")]
    ArityMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    /// Artifact does not expose the requested inference capability
    #[error("inference capability unavailable: {0}")]
    InferenceCapability(String),

    /// Tensor evaluation errors
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new missing-artifact error
    pub fn missing(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Create a new artifact load error
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new inference capability error
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::InferenceCapability(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a load-time failure of a single artifact
    /// (as opposed to a configuration or internal problem).
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact { .. } | Self::ArtifactLoad { .. } | Self::ArityUnknown { .. }
        )
    }
}
