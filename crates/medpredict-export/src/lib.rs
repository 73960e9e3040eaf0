//! MedPredict Export
//!
//! Offline conversion of classical model artifacts into the portable
//! safetensors format, with a JSON manifest describing each run.
//!
//! Conversion is best-effort per key: a missing file, an unconvertible kind
//! or an undeterminable feature count is recorded in that key's manifest
//! entry and the batch carries on.

pub mod catalog;
pub mod manifest;
pub mod pipeline;

pub use catalog::{copy_auxiliary, list_with_status, CatalogEntry, EntryKind};
pub use manifest::{ExportManifest, ExportStatus, ManifestEntry, ManifestMetadata, MANIFEST_FILE};
pub use pipeline::{discover_arity, Exporter, DEFAULT_OUT_DIR};
