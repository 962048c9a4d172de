//! Party EDI configuration

use crate::identifier::IdentifierType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::trace;

/// Configuration for identifier types and NAD resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyEdiConfig {
    /// Identifier types offered on parties (default: all)
    pub identifier_types: Vec<IdentifierType>,
    /// Field delimiter of flattened NAD lines (default: `|`)
    pub delimiter: char,
    /// Only resolve to parties that allow EDI (default: false)
    pub allow_edi_only: bool,
}

impl Default for PartyEdiConfig {
    fn default() -> Self {
        Self {
            identifier_types: IdentifierType::ALL.to_vec(),
            delimiter: '|',
            allow_edi_only: false,
        }
    }
}

impl PartyEdiConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enabled identifier types
    #[must_use]
    pub fn identifier_types(mut self, types: impl IntoIterator<Item = IdentifierType>) -> Self {
        self.identifier_types = types.into_iter().collect();
        self
    }

    /// Set the field delimiter
    #[must_use]
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Restrict resolution to parties that allow EDI
    #[must_use]
    pub fn allow_edi_only(mut self, allow_edi_only: bool) -> Self {
        self.allow_edi_only = allow_edi_only;
        self
    }

    /// Check if an identifier type is enabled
    pub fn is_enabled(&self, kind: IdentifierType) -> bool {
        self.identifier_types.contains(&kind)
    }

    /// `(code, label)` pairs of the enabled types, in their canonical order
    pub fn identifier_type_selection(&self) -> Vec<(&'static str, &'static str)> {
        IdentifierType::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .map(|kind| (kind.code(), kind.label()))
            .collect()
    }

    /// Load a configuration file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn load_from_file(path: &Path) -> Result<Self> {
        trace!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse a configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::invalid_format("YAML parse error", e))
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_format("JSON parse error", e))
    }
}
