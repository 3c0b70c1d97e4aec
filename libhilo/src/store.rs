//! On-disk thread document format.
//!
//! The surrounding tooling exchanges threads as a JSON document of the
//! shape `{"threads": [["post", ...], ...]}` — an array of thread-arrays,
//! each inner array an ordered list of post bodies. This module owns
//! (de)serialization of that format; it stays byte-compatible with files
//! written by other front ends.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A saved collection of threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadDocument {
    pub threads: Vec<Vec<String>>,
}

impl ThreadDocument {
    pub fn new(threads: Vec<Vec<String>>) -> Self {
        Self { threads }
    }

    /// Read a document from `path`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the document to `path`, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
