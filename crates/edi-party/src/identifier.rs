//! Party identifiers and the EDI identifier types

use crate::party::{Party, PartyId};
use crate::registry::IdentifierRegistry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Identifier type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    /// Tax identification number
    Vat,
    /// EDI operational point of the head office
    EdiHead,
    /// EDI operational point of the paying party
    EdiPay,
}

impl IdentifierType {
    /// Every known identifier type, in selection order.
    pub const ALL: [IdentifierType; 3] = [Self::Vat, Self::EdiHead, Self::EdiPay];

    /// Stored code of the type
    pub fn code(self) -> &'static str {
        match self {
            Self::Vat => "vat",
            Self::EdiHead => "edi_head",
            Self::EdiPay => "edi_pay",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Vat => "VAT",
            Self::EdiHead => "EDI Operational Point (Head Office)",
            Self::EdiPay => "EDI Operational Point (Who Pays)",
        }
    }

    /// `(code, label)` pairs for every known type.
    pub fn selection() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|t| (t.code(), t.label())).collect()
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IdentifierType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| Error::UnknownIdentifierType(s.to_string()))
    }
}

/// Identifier record id
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierId(pub u64);

impl fmt::Display for IdentifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A typed code owned by a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: IdentifierId,
    pub party: PartyId,
    #[serde(rename = "type")]
    pub kind: IdentifierType,
    pub code: String,
}

/// Code of the first identifier of `kind` attached to `party`.
pub fn identifier_code(party: &Party, kind: IdentifierType) -> Option<&str> {
    party
        .identifiers
        .iter()
        .find(|i| i.kind == kind)
        .map(|i| i.code.as_str())
}

/// Write `code` as the `kind` identifier of every party in `parties`.
///
/// The first identifier of that type on each party is overwritten; parties
/// without one get a new identifier.
pub fn set_identifier_code<R>(
    registry: &mut R,
    parties: &[PartyId],
    kind: IdentifierType,
    code: &str,
) -> Result<()>
where
    R: IdentifierRegistry + ?Sized,
{
    for &party in parties {
        let identifier = registry.upsert_identifier(party, kind, code)?;
        debug!(
            party = %party,
            identifier = %identifier.id,
            kind = %kind,
            "identifier code written"
        );
    }
    Ok(())
}

impl Party {
    /// Head office EDI operational point.
    pub fn edi_head(&self) -> Option<&str> {
        identifier_code(self, IdentifierType::EdiHead)
    }

    /// Paying party EDI operational point.
    pub fn edi_pay(&self) -> Option<&str> {
        identifier_code(self, IdentifierType::EdiPay)
    }

    /// VAT code.
    pub fn vat_code(&self) -> Option<&str> {
        identifier_code(self, IdentifierType::Vat)
    }
}
