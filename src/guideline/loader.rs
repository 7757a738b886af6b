//! Guideline loader - JSON/YAML file loading
//!
//! This module handles loading guideline documents from disk.

use super::document::GuidelineDocument;
use crate::error::GuidelineError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads guideline documents from JSON or YAML files
pub struct GuidelineLoader;

impl GuidelineLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a guideline document, choosing the parser from the extension
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<GuidelineDocument, GuidelineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let value: Value = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        let doc = GuidelineDocument::from_value(value)?;
        log::debug!(
            "Loaded {} guideline '{}' from {}",
            doc.format(),
            doc.id(),
            path.display()
        );
        Ok(doc)
    }

    /// Load every guideline document in a directory, sorted by file name
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_dir<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<Vec<(PathBuf, GuidelineDocument)>, GuidelineError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_guideline_file(p))
            .collect();
        paths.sort();

        let mut docs = Vec::new();
        for path in paths {
            match self.load(&path) {
                Ok(doc) => docs.push((path, doc)),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(docs)
    }

    /// Find a document in a directory by its `guideline_id` or file stem
    pub fn find_in_dir<P: AsRef<Path>>(
        &self,
        dir: P,
        id: &str,
    ) -> Result<GuidelineDocument, GuidelineError> {
        self.load_dir(dir)?
            .into_iter()
            .find(|(path, doc)| {
                doc.id() == id || path.file_stem().and_then(|s| s.to_str()) == Some(id)
            })
            .map(|(_, doc)| doc)
            .ok_or_else(|| GuidelineError::NotFound { id: id.to_string() })
    }
}

impl Default for GuidelineLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn is_guideline_file(path: &Path) -> bool {
    path.is_file() && (is_yaml(path) || path.extension().is_some_and(|ext| ext == "json"))
}
