//! Supplier records decoded from NAD segments
//!
//! Decoding fills a [`SupplierEdiRecord`] from the tokens of one NAD line.
//! Resolution then attaches a known party and address to the record, trying
//! in order:
//!
//! 1. the `edi_head` identifier whose code equals the EDI code
//! 2. the `vat` identifier whose code equals the record's VAT, if step 1 missed
//! 3. the address whose `edi_ean` equals the EDI code; its owner becomes the
//!    party when neither step above attached one
//!
//! A miss at any step leaves the field unset.

use crate::config::PartyEdiConfig;
use crate::identifier::IdentifierType;
use crate::nad::{NadQualifier, TokenCursor};
use crate::party::{AddressId, PartyId};
use crate::registry::{AddressRegistry, IdentifierRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Supplier data carried by one NAD segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierEdiRecord {
    #[serde(rename = "type")]
    pub qualifier: NadQualifier,
    pub edi_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub party: Option<PartyId>,
    #[serde(default)]
    pub address: Option<AddressId>,
}

impl SupplierEdiRecord {
    /// Create an empty record for a qualifier
    pub fn new(qualifier: NadQualifier) -> Self {
        Self {
            qualifier,
            edi_code: String::new(),
            vat: None,
            name: None,
            street: None,
            city: None,
            zip: None,
            country: None,
            party: None,
            address: None,
        }
    }

    /// Decode the tokens that follow a NAD tag.
    ///
    /// Short input never fails: a missing EDI code decodes as `""` and a
    /// missing VAT stays `None`.
    pub fn decode(qualifier: NadQualifier, tokens: &[String]) -> Self {
        let mut cursor = TokenCursor::new(tokens);
        Self::read(qualifier, &mut cursor)
    }

    /// Decode from a cursor, leaving unread tokens in place.
    pub fn read(qualifier: NadQualifier, cursor: &mut TokenCursor<'_>) -> Self {
        let mut record = Self::new(qualifier);
        record.edi_code = cursor.next_or_empty().to_string();
        if qualifier.carries_vat() {
            record.vat = cursor.next_token().map(str::to_string);
        }
        record
    }

    /// Check if a party has been attached
    pub fn is_resolved(&self) -> bool {
        self.party.is_some()
    }
}

/// Lookup step that attached the party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyMatch {
    EdiHead,
    Vat,
    Address,
}

/// Outcome of one resolution run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Step that attached the party during this run, if any
    pub party_match: Option<PartyMatch>,
    /// Whether an address was attached during this run
    pub address_matched: bool,
}

impl Resolution {
    /// Check if nothing matched
    pub fn is_unresolved(&self) -> bool {
        self.party_match.is_none() && !self.address_matched
    }
}

/// Resolves supplier records against identifier and address registries.
///
/// The registry is only read; results are written to the record.
pub struct PartyResolver<'r, R: ?Sized> {
    registry: &'r R,
    lookup_edi_head: bool,
    lookup_vat: bool,
    allow_edi_only: bool,
}

impl<'r, R> PartyResolver<'r, R>
where
    R: IdentifierRegistry + AddressRegistry + ?Sized,
{
    /// Create a resolver with every lookup enabled
    pub fn new(registry: &'r R) -> Self {
        Self {
            registry,
            lookup_edi_head: true,
            lookup_vat: true,
            allow_edi_only: false,
        }
    }

    /// Apply identifier type and EDI filtering settings
    #[must_use]
    pub fn with_config(mut self, config: &PartyEdiConfig) -> Self {
        self.lookup_edi_head = config.is_enabled(IdentifierType::EdiHead);
        self.lookup_vat = config.is_enabled(IdentifierType::Vat);
        self.allow_edi_only = config.allow_edi_only;
        self
    }

    /// Attach the matching party and address to `record`.
    pub fn resolve(&self, record: &mut SupplierEdiRecord) -> Resolution {
        let mut resolution = Resolution::default();

        if self.lookup_edi_head && !record.edi_code.is_empty() {
            if let Some(party) = self.find_party(IdentifierType::EdiHead, &record.edi_code) {
                record.party = Some(party);
                resolution.party_match = Some(PartyMatch::EdiHead);
            }
        }

        if resolution.party_match.is_none() && self.lookup_vat {
            // An empty VAT is treated as absent
            if let Some(vat) = record.vat.as_deref().filter(|v| !v.is_empty()) {
                if let Some(party) = self.find_party(IdentifierType::Vat, vat) {
                    record.party = Some(party);
                    resolution.party_match = Some(PartyMatch::Vat);
                }
            }
        }

        if !record.edi_code.is_empty() {
            let address = self
                .registry
                .search_addresses_by_edi_ean(&record.edi_code, self.search_limit())
                .into_iter()
                .find(|a| self.accepts(a.party));

            if let Some(address) = address {
                record.address = Some(address.id);
                resolution.address_matched = true;
                if record.party.is_none() {
                    record.party = Some(address.party);
                    resolution.party_match = Some(PartyMatch::Address);
                }
            }
        }

        debug!(
            qualifier = %record.qualifier,
            edi_code = %record.edi_code,
            party = ?record.party,
            address = ?record.address,
            matched_by = ?resolution.party_match,
            "supplier record resolved"
        );

        resolution
    }

    fn find_party(&self, kind: IdentifierType, code: &str) -> Option<PartyId> {
        trace!(kind = %kind, code, "looking up party by identifier");
        self.registry
            .search_identifiers(kind, code, self.search_limit())
            .into_iter()
            .map(|i| i.party)
            .find(|&party| self.accepts(party))
    }

    fn accepts(&self, party: PartyId) -> bool {
        !self.allow_edi_only
            || self
                .registry
                .party(party)
                .is_some_and(|p| p.allow_edi)
    }

    // With EDI filtering the first hit may be rejected, so look at all hits.
    fn search_limit(&self) -> Option<usize> {
        if self.allow_edi_only { None } else { Some(1) }
    }
}
