//! Catalog listing and auxiliary file copies

use medpredict_core::Result;
use medpredict_models::config::{ENCODER_KEY, SYMPTOM_COLUMNS_KEY};
use medpredict_models::ModelsConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a catalog line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Model,
    Auxiliary,
}

/// One catalog line with its on-disk status
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: EntryKind,
    pub path: PathBuf,
    pub exists: bool,
}

impl CatalogEntry {
    fn new(name: impl Into<String>, kind: EntryKind, path: PathBuf) -> Self {
        let exists = path.is_file();
        Self {
            name: name.into(),
            kind,
            path,
            exists,
        }
    }
}

fn auxiliary_paths(config: &ModelsConfig) -> Vec<(&'static str, PathBuf)> {
    [
        (ENCODER_KEY, config.encoder_path()),
        (SYMPTOM_COLUMNS_KEY, config.symptom_columns_path()),
    ]
    .into_iter()
    .filter_map(|(name, path)| path.map(|p| (name, p)))
    .collect()
}

/// Every model key and auxiliary file with whether it exists
pub fn list_with_status(config: &ModelsConfig) -> Vec<CatalogEntry> {
    let models = config.models.keys().filter_map(|key| {
        config
            .model_path(key)
            .map(|path| CatalogEntry::new(key.clone(), EntryKind::Model, path))
    });
    let auxiliary = auxiliary_paths(config)
        .into_iter()
        .map(|(name, path)| CatalogEntry::new(name, EntryKind::Auxiliary, path));

    models.chain(auxiliary).collect()
}

/// Copy the auxiliary files verbatim into `out_dir`.
///
/// Missing sources are warned about and skipped. Returns the written paths.
pub fn copy_auxiliary(config: &ModelsConfig, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut copied = Vec::new();

    for (name, source) in auxiliary_paths(config) {
        let Some(file_name) = source.file_name() else {
            warn!("Auxiliary path for {} has no file name: {}", name, source.display());
            continue;
        };
        if !source.is_file() {
            warn!("Auxiliary file not found: {}", source.display());
            continue;
        }

        let target = out_dir.join(file_name);
        std::fs::copy(&source, &target)?;
        info!("Copied auxiliary file: {}", target.display());
        copied.push(target);
    }

    Ok(copied)
}
