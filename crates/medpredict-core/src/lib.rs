//! MedPredict Core
//!
//! Core types and error handling shared across MedPredict components.
//!
//! This crate provides:
//! - Prediction domains and their fixed feature arities
//! - Feature vectors and prediction results
//! - The error taxonomy used by the registry, encoders, and export pipeline

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ConfidenceTier, Domain, FeatureVector, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ConfidenceTier, Domain, FeatureVector, PredictionResult};
}
