// SPDX-License-Identifier: MIT

//! Guideline document format discrimination
//!
//! The format is decided once, when a document is parsed. A document with
//! both `rules` and `edges` is graph/rules (NICE); one with `inputs` and
//! `nodes` is legacy.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::nice::NiceGuideline;
use super::types::Guideline;
use crate::error::DocumentError;

/// Which shape a guideline document has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidelineFormat {
    Legacy,
    Nice,
}

impl fmt::Display for GuidelineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuidelineFormat::Legacy => write!(f, "legacy"),
            GuidelineFormat::Nice => write!(f, "nice"),
        }
    }
}

/// A guideline in either supported format
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GuidelineDocument {
    Legacy(Guideline),
    Nice(NiceGuideline),
}

impl GuidelineDocument {
    /// Classify and deserialize a raw JSON value
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let format = detect_format(&value)?;

        let invalid = |e: serde_json::Error| DocumentError::InvalidStructure(e.to_string());
        match format {
            GuidelineFormat::Nice => serde_json::from_value(value)
                .map(GuidelineDocument::Nice)
                .map_err(invalid),
            GuidelineFormat::Legacy => serde_json::from_value(value)
                .map(GuidelineDocument::Legacy)
                .map_err(invalid),
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| DocumentError::InvalidStructure(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| DocumentError::InvalidStructure(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn format(&self) -> GuidelineFormat {
        match self {
            GuidelineDocument::Legacy(_) => GuidelineFormat::Legacy,
            GuidelineDocument::Nice(_) => GuidelineFormat::Nice,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            GuidelineDocument::Legacy(g) => &g.guideline_id,
            GuidelineDocument::Nice(g) => &g.guideline_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GuidelineDocument::Legacy(g) => &g.name,
            GuidelineDocument::Nice(g) => &g.name,
        }
    }

    pub fn as_legacy(&self) -> Option<&Guideline> {
        match self {
            GuidelineDocument::Legacy(g) => Some(g),
            GuidelineDocument::Nice(_) => None,
        }
    }

    pub fn as_nice(&self) -> Option<&NiceGuideline> {
        match self {
            GuidelineDocument::Nice(g) => Some(g),
            GuidelineDocument::Legacy(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for GuidelineDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        GuidelineDocument::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Decide the document shape from its top-level keys
pub fn detect_format(value: &Value) -> Result<GuidelineFormat, DocumentError> {
    let obj = value.as_object().ok_or(DocumentError::UnknownFormat)?;

    for field in ["guideline_id", "name", "nodes"] {
        if !obj.contains_key(field) {
            return Err(DocumentError::MissingField(field));
        }
    }

    if obj.contains_key("rules") && obj.contains_key("edges") {
        Ok(GuidelineFormat::Nice)
    } else if obj.contains_key("inputs") {
        Ok(GuidelineFormat::Legacy)
    } else {
        Err(DocumentError::UnknownFormat)
    }
}
