//! Auxiliary artifacts of the common domain
//!
//! The label encoder maps class indices to disease names; the symptom table
//! fixes the order (and therefore the arity) of the one-hot feature vector.
//!
//! - label encoder: `{"classes": ["Common Cold", "Flu", ...]}`
//! - symptom table: `["fever", "headache", ...]`

use medpredict_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn read_json<T: serde::de::DeserializeOwned>(key: &str, path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::missing(key, path));
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::load(path, e))
}

/// Bijection between class indices and class names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(crate::config::ENCODER_KEY, path.as_ref())
    }

    /// Index of a class name
    pub fn forward(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// Class name at an index
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Decode a predicted class value
    pub fn decode(&self, class: i64) -> Result<&str> {
        usize::try_from(class)
            .ok()
            .and_then(|idx| self.inverse(idx))
            .ok_or_else(|| {
                Error::model(format!(
                    "class {} outside label encoder range 0..{}",
                    class,
                    self.classes.len()
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Ordered symptom-name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomTable {
    columns: Vec<String>,
}

impl SymptomTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(crate::config::SYMPTOM_COLUMNS_KEY, path.as_ref())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
