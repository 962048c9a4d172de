//! Serializable registry snapshots
//!
//! A snapshot is the file form of a [`PartyStore`]: parties with their
//! identifiers and the addresses that belong to them. Identifier ids are
//! stored with the identifiers, so lookups that take the lowest id give the
//! same answer before and after a save.

use crate::identifier::{Identifier, IdentifierId, IdentifierType};
use crate::party::{Address, Party, PartyId};
use crate::registry::PartyStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, trace};

/// File form of a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEntry {
    pub id: PartyId,
    pub name: String,
    #[serde(default)]
    pub allow_edi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edi_operational_point: Option<String>,
    #[serde(default)]
    pub identifiers: Vec<IdentifierEntry>,
}

/// File form of an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierEntry {
    pub id: IdentifierId,
    #[serde(rename = "type")]
    pub kind: IdentifierType,
    pub code: String,
}

/// Parties and addresses of a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub parties: Vec<PartyEntry>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl RegistrySnapshot {
    /// Capture the current content of a store
    pub fn from_store(store: &PartyStore) -> Self {
        let parties = store
            .parties()
            .map(|p| PartyEntry {
                id: p.id,
                name: p.name.clone(),
                allow_edi: p.allow_edi,
                edi_operational_point: p.edi_operational_point.clone(),
                identifiers: p
                    .identifiers
                    .iter()
                    .map(|i| IdentifierEntry {
                        id: i.id,
                        kind: i.kind,
                        code: i.code.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            parties,
            addresses: store.addresses().cloned().collect(),
        }
    }

    /// Build a store, validating ids, owners, and field lengths
    pub fn into_store(self) -> Result<PartyStore> {
        let mut store = PartyStore::new();

        for entry in self.parties {
            let mut party = Party::new(entry.id, entry.name).with_allow_edi(entry.allow_edi);
            party.set_edi_operational_point(entry.edi_operational_point)?;
            party.identifiers = entry
                .identifiers
                .into_iter()
                .map(|i| Identifier {
                    id: i.id,
                    party: entry.id,
                    kind: i.kind,
                    code: i.code,
                })
                .collect();
            store.add_party(party)?;
        }

        for address in self.addresses {
            store.add_address(address)?;
        }

        info!(
            parties = store.len(),
            addresses = store.addresses().count(),
            "registry snapshot loaded"
        );
        Ok(store)
    }

    /// Read a snapshot file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn load_from_file(path: &Path) -> Result<Self> {
        trace!("Loading registry snapshot from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if is_yaml(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Write a snapshot file in the format chosen by its extension
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        trace!("Writing registry snapshot to file: {:?}", path);
        let content = if is_yaml(path) {
            self.to_yaml()?
        } else {
            self.to_json()?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parse a snapshot from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::invalid_format("YAML parse error", e))
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_format("JSON parse error", e))
    }

    /// Render the snapshot as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::invalid_format("YAML write error", e))
    }

    /// Render the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::invalid_format("JSON write error", e))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
}
