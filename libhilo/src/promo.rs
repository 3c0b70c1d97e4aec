//! Promotional post library.
//!
//! A small JSON-file-backed collection of reusable promotional posts a
//! caller can append to a thread before publishing. Reads are tolerant: a
//! missing or corrupt file behaves as an empty library so the composing
//! flow never blocks on it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{HiloError, Result, StoreError};

/// One reusable promotional post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromoEntry {
    pub text: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Library of promotional posts bound to a JSON file.
pub struct PromoLibrary {
    path: PathBuf,
}

impl PromoLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved entries. A missing or unreadable file reads as empty.
    pub fn all(&self) -> Vec<PromoEntry> {
        if !self.path.exists() {
            return Vec::new();
        }
        let loaded = std::fs::read_to_string(&self.path)
            .map_err(StoreError::from)
            .and_then(|content| Ok(serde_json::from_str(&content)?));
        match loaded {
            Ok(entries) => entries,
            Err(e) => {
                error!("error reading promotions file: {}", e);
                Vec::new()
            }
        }
    }

    /// Add a new promotional post to the library.
    pub fn add(&self, text: &str, image_path: Option<String>) -> Result<()> {
        if text.is_empty() {
            return Err(HiloError::InvalidInput(
                "promotional text cannot be empty".to_string(),
            ));
        }
        let mut entries = self.all();
        entries.push(PromoEntry {
            text: text.to_string(),
            image_path,
        });
        self.save(&entries)?;
        info!("added new promotion: {}", snippet(text));
        Ok(())
    }

    /// Delete the entry matching `entry` on both text and image path.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&self, entry: &PromoEntry) -> Result<bool> {
        let entries = self.all();
        let remaining: Vec<PromoEntry> = entries.iter().filter(|e| *e != entry).cloned().collect();

        if remaining.len() < entries.len() {
            self.save(&remaining)?;
            info!("deleted promotion: {}", snippet(&entry.text));
            Ok(true)
        } else {
            warn!("could not find the specified promotion to delete");
            Ok(false)
        }
    }

    fn save(&self, entries: &[PromoEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).map_err(StoreError::Json)?;
        std::fs::write(&self.path, json).map_err(StoreError::Io)?;
        Ok(())
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(50).collect()
}
