//! MedPredict Models
//!
//! Loading and evaluation of trained classifier artifacts.
//!
//! - [`ModelRegistry`]: keyed, read-only collection of loaded artifacts
//! - [`ModelArtifact`]: one estimator plus its kind, capabilities and arity
//! - [`confidence`]: tiered derivation of a confidence percentage
//! - [`arbitration`]: two-model selection for the common-disease domain
//!
//! Artifacts come in two formats. Native JSON documents are what training
//! writes; portable safetensors containers are what the export pipeline
//! produces for classical estimators. Both evaluate identically.

pub mod arbitration;
pub mod artifact;
pub mod auxiliary;
pub mod centroid;
pub mod config;
pub mod confidence;
pub mod linear;
pub mod native;
pub mod neural;
pub mod portable;
pub mod predict;
pub mod registry;

pub use arbitration::{arbitrate, PRIMARY_MODEL, SECONDARY_MODEL};
pub use artifact::{
    ArtifactFormat, ArtifactKind, ArtifactRuntime, Capabilities, ModelArtifact, RawOutput,
};
pub use auxiliary::{LabelEncoder, SymptomTable};
pub use config::{
    AuxiliarySpec, ModelSpec, ModelsConfig, COMMON_PRIMARY_KEY, COMMON_SECONDARY_KEY,
};
pub use confidence::Confidence;
pub use native::ArtifactDocument;
pub use portable::PORTABLE_FORMAT;
pub use predict::{predict_risk, RiskPrediction};
pub use registry::{ModelRegistry, RegistryEntry, SharedRegistry};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::arbitration::arbitrate;
    pub use crate::artifact::{ArtifactKind, ModelArtifact, RawOutput};
    pub use crate::auxiliary::{LabelEncoder, SymptomTable};
    pub use crate::config::ModelsConfig;
    pub use crate::predict::{predict_risk, RiskPrediction};
    pub use crate::registry::{ModelRegistry, SharedRegistry};
}
