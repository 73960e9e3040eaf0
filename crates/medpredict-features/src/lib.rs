//! MedPredict Feature Encoders
//!
//! Pure, total mappings from coarse self-reported survey answers to the
//! numeric feature vectors the trained models expect.
//!
//! Encoders never reject a request. Unrecognized answers fall back to the
//! field's lowest-severity sentinel and are reported in [`Encoded::degraded`]
//! so the caller can log or count them.

pub mod diabetes;
pub mod heart;
pub mod lenient;
pub mod ordinal;
pub mod parkinsons;
pub mod symptoms;

use medpredict_core::Domain;

pub use diabetes::{DiabetesEncoder, DiabetesInput};
pub use heart::{HeartEncoder, HeartInput};
pub use ordinal::{DegradedField, Encoded, OrdinalScale};
pub use parkinsons::{ParkinsonsEncoder, ParkinsonsInput};
pub use symptoms::{canonical_symptom, CommonInput, SymptomEncoder};

/// Trait for all domain encoders
pub trait FeatureEncoder {
    /// Categorical input record accepted by this encoder
    type Input;

    /// Domain this encoder produces features for
    fn domain(&self) -> Domain;

    /// Map an input record to a feature vector. Never fails.
    fn encode(&self, input: &Self::Input) -> Encoded;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CommonInput, DiabetesEncoder, DiabetesInput, Encoded, FeatureEncoder, HeartEncoder,
        HeartInput, ParkinsonsEncoder, ParkinsonsInput, SymptomEncoder,
    };
}
