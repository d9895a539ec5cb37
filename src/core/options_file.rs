//! Options file
//!
//! Loads part options from `staticlxml.toml`. Each top-level table is a
//! part; its keys are option names and its values strings or booleans:
//!
//! ```toml
//! [lxml]
//! static-build = true
//! libxml2-url = "https://mirror.example.com/libxml2-2.9.14.tar.xz"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::options::{canonical_bool, OptionMap};

/// Options file error types
#[derive(Error, Debug)]
pub enum OptionsFileError {
    /// Failed to read options file
    #[error("Failed to read options file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse options file
    #[error("Failed to parse options file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// A single option value as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `key = true`
    Bool(bool),
    /// `key = "value"`
    Text(String),
}

impl OptionValue {
    /// String form handed to the option resolver
    pub fn into_string(self) -> String {
        match self {
            Self::Bool(b) => canonical_bool(b).to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Parsed options file: part name to its options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsFile {
    parts: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl OptionsFile {
    /// Load an options file
    ///
    /// A missing file yields no parts; an invalid one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, OptionsFileError> {
        if !path.exists() {
            tracing::debug!("No options file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| OptionsFileError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| OptionsFileError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Parse options from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Options of one part; empty when the part is absent
    pub fn options_for(&self, part: &str) -> OptionMap {
        self.parts
            .get(part)
            .map(|table| {
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone().into_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Overlay `key=value` pairs on top of file options
///
/// Later pairs win.
pub fn overlay(mut options: OptionMap, overrides: &[(String, String)]) -> OptionMap {
    for (key, value) in overrides {
        options.insert(key.clone(), value.clone());
    }
    options
}
