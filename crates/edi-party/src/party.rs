//! Party and address records

use crate::identifier::Identifier;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an EDI operational point code
pub const EDI_OPERATIONAL_POINT_SIZE: usize = 35;

/// Party record id
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(pub u64);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Address record id
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub u64);

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A party (person or organization) with its EDI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,

    /// Allow EDI communications
    #[serde(default)]
    pub allow_edi: bool,

    /// Routing code of the party's EDI business unit
    #[serde(default)]
    pub edi_operational_point: Option<String>,

    /// Identifiers in creation order
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
}

impl Party {
    /// Create a party without identifiers and with EDI disabled
    pub fn new(id: PartyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            allow_edi: false,
            edi_operational_point: None,
            identifiers: Vec::new(),
        }
    }

    /// Enable or disable EDI communications
    #[must_use]
    pub fn with_allow_edi(mut self, allow_edi: bool) -> Self {
        self.allow_edi = allow_edi;
        self
    }

    /// Set the operational point, rejecting codes over 35 characters.
    pub fn set_edi_operational_point(&mut self, code: Option<String>) -> Result<()> {
        if let Some(code) = &code {
            check_operational_point(code)?;
        }
        self.edi_operational_point = code;
        Ok(())
    }

    /// Check field constraints on a party built outside the setters.
    pub fn validate(&self) -> Result<()> {
        match &self.edi_operational_point {
            Some(code) => check_operational_point(code),
            None => Ok(()),
        }
    }
}

fn check_operational_point(code: &str) -> Result<()> {
    let actual = code.chars().count();
    if actual > EDI_OPERATIONAL_POINT_SIZE {
        return Err(Error::field_too_long(
            "edi_operational_point",
            EDI_OPERATIONAL_POINT_SIZE,
            actual,
        ));
    }
    Ok(())
}

/// A postal address owned by a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub party: PartyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// EDI lookup code of the address
    #[serde(default)]
    pub edi_ean: Option<String>,
}

impl Address {
    /// Create an empty address for `party`
    pub fn new(id: AddressId, party: PartyId) -> Self {
        Self {
            id,
            party,
            name: None,
            street: None,
            zip: None,
            city: None,
            country: None,
            edi_ean: None,
        }
    }

    /// Set the EDI lookup code
    #[must_use]
    pub fn with_edi_ean(mut self, edi_ean: impl Into<String>) -> Self {
        self.edi_ean = Some(edi_ean.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_point_accepts_35_chars() {
        let mut party = Party::new(PartyId(1), "Buyer");
        let code = "1".repeat(EDI_OPERATIONAL_POINT_SIZE);
        party.set_edi_operational_point(Some(code.clone())).unwrap();
        assert_eq!(party.edi_operational_point, Some(code));
    }

    #[test]
    fn test_operational_point_rejects_36_chars() {
        let mut party = Party::new(PartyId(1), "Buyer");
        let err = party
            .set_edi_operational_point(Some("1".repeat(36)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FieldTooLong {
                max: 35,
                actual: 36,
                ..
            }
        ));
        assert_eq!(party.edi_operational_point, None);
    }

    #[test]
    fn test_operational_point_counts_characters() {
        let mut party = Party::new(PartyId(1), "Buyer");
        // 35 two-byte characters
        assert!(party.set_edi_operational_point(Some("é".repeat(35))).is_ok());
    }

    #[test]
    fn test_validate_catches_direct_assignment() {
        let mut party = Party::new(PartyId(1), "Buyer");
        party.edi_operational_point = Some("x".repeat(40));
        assert!(party.validate().is_err());
        party.edi_operational_point = None;
        assert!(party.validate().is_ok());
    }

    #[test]
    fn test_new_party_defaults() {
        let party = Party::new(PartyId(7), "Seller").with_allow_edi(true);
        assert!(party.allow_edi);
        assert!(party.identifiers.is_empty());
        assert_eq!(party.id, PartyId(7));
        assert_eq!(party.edi_operational_point, None);
    }
}
