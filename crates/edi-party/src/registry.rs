//! Identifier and address registries

use crate::identifier::{Identifier, IdentifierId, IdentifierType};
use crate::party::{Address, AddressId, Party, PartyId};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

/// Lookup and write access to party identifiers.
///
/// Searches return matches in ascending identifier id order.
pub trait IdentifierRegistry {
    /// Get a party with its identifiers
    fn party(&self, id: PartyId) -> Option<&Party>;

    /// Find identifiers of `kind` whose code equals `code`
    fn search_identifiers(
        &self,
        kind: IdentifierType,
        code: &str,
        limit: Option<usize>,
    ) -> Vec<Identifier>;

    /// Attach a new identifier to `party`
    fn create_identifier(
        &mut self,
        party: PartyId,
        kind: IdentifierType,
        code: &str,
    ) -> Result<Identifier>;

    /// Overwrite the code of an existing identifier
    fn write_identifier(&mut self, id: IdentifierId, code: &str) -> Result<Identifier>;

    /// Write `code` to the first `kind` identifier of `party`, creating it if absent.
    fn upsert_identifier(
        &mut self,
        party: PartyId,
        kind: IdentifierType,
        code: &str,
    ) -> Result<Identifier> {
        let existing = self
            .party(party)
            .ok_or(Error::PartyNotFound(party))?
            .identifiers
            .iter()
            .find(|i| i.kind == kind)
            .map(|i| i.id);

        match existing {
            Some(id) => self.write_identifier(id, code),
            None => self.create_identifier(party, kind, code),
        }
    }
}

/// Lookup access to addresses.
pub trait AddressRegistry {
    /// Find addresses whose EDI lookup code equals `edi_ean`, in ascending id order
    fn search_addresses_by_edi_ean(&self, edi_ean: &str, limit: Option<usize>) -> Vec<Address>;
}

/// In-memory registry of parties, their identifiers, and addresses
#[derive(Debug, Clone, Default)]
pub struct PartyStore {
    parties: BTreeMap<PartyId, Party>,
    addresses: BTreeMap<AddressId, Address>,
    identifier_owners: HashMap<IdentifierId, PartyId>,
    next_identifier: u64,
}

impl PartyStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party together with any identifiers it already carries.
    ///
    /// Every carried identifier must name the party as its owner, and
    /// identifier ids must be unique across the store.
    pub fn add_party(&mut self, party: Party) -> Result<()> {
        if self.parties.contains_key(&party.id) {
            return Err(Error::DuplicateParty(party.id));
        }
        party.validate()?;

        let mut seen = HashSet::new();
        let mut next_identifier = self.next_identifier;
        for identifier in &party.identifiers {
            if identifier.party != party.id {
                return Err(Error::IdentifierOwnerMismatch {
                    identifier: identifier.id,
                    owner: identifier.party,
                    party: party.id,
                });
            }
            if self.identifier_owners.contains_key(&identifier.id) || !seen.insert(identifier.id) {
                return Err(Error::DuplicateIdentifier(identifier.id));
            }
            let after = identifier
                .id
                .0
                .checked_add(1)
                .ok_or(Error::IdentifierSequenceExhausted)?;
            next_identifier = next_identifier.max(after);
        }

        for identifier in &party.identifiers {
            self.identifier_owners.insert(identifier.id, party.id);
        }
        self.next_identifier = next_identifier;
        self.parties.insert(party.id, party);
        Ok(())
    }

    /// Register an address; its owning party must already exist.
    pub fn add_address(&mut self, address: Address) -> Result<()> {
        if !self.parties.contains_key(&address.party) {
            return Err(Error::PartyNotFound(address.party));
        }
        if self.addresses.contains_key(&address.id) {
            return Err(Error::DuplicateAddress(address.id));
        }
        self.addresses.insert(address.id, address);
        Ok(())
    }

    /// Get an address by id
    pub fn address(&self, id: AddressId) -> Option<&Address> {
        self.addresses.get(&id)
    }

    /// All parties in id order
    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    /// All addresses in id order
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    /// Parties that allow EDI communications
    pub fn edi_parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values().filter(|p| p.allow_edi)
    }

    /// Number of registered parties
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    /// Check if the store has no parties
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

impl IdentifierRegistry for PartyStore {
    fn party(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(&id)
    }

    fn search_identifiers(
        &self,
        kind: IdentifierType,
        code: &str,
        limit: Option<usize>,
    ) -> Vec<Identifier> {
        let mut matches: Vec<&Identifier> = self
            .parties
            .values()
            .flat_map(|p| p.identifiers.iter())
            .filter(|i| i.kind == kind && i.code == code)
            .collect();
        matches.sort_by_key(|i| i.id);

        trace!(kind = %kind, code, found = matches.len(), "identifier search");

        matches
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn create_identifier(
        &mut self,
        party: PartyId,
        kind: IdentifierType,
        code: &str,
    ) -> Result<Identifier> {
        let owner = self
            .parties
            .get_mut(&party)
            .ok_or(Error::PartyNotFound(party))?;

        let next_identifier = self
            .next_identifier
            .checked_add(1)
            .ok_or(Error::IdentifierSequenceExhausted)?;
        let identifier = Identifier {
            id: IdentifierId(self.next_identifier),
            party,
            kind,
            code: code.to_string(),
        };
        self.next_identifier = next_identifier;

        owner.identifiers.push(identifier.clone());
        self.identifier_owners.insert(identifier.id, party);
        Ok(identifier)
    }

    fn write_identifier(&mut self, id: IdentifierId, code: &str) -> Result<Identifier> {
        let identifier = self
            .identifier_owners
            .get(&id)
            .and_then(|owner| self.parties.get_mut(owner))
            .and_then(|p| p.identifiers.iter_mut().find(|i| i.id == id))
            .ok_or(Error::IdentifierNotFound(id))?;

        identifier.code = code.to_string();
        Ok(identifier.clone())
    }
}

impl AddressRegistry for PartyStore {
    fn search_addresses_by_edi_ean(&self, edi_ean: &str, limit: Option<usize>) -> Vec<Address> {
        let matches: Vec<Address> = self
            .addresses
            .values()
            .filter(|a| a.edi_ean.as_deref() == Some(edi_ean))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        trace!(edi_ean, found = matches.len(), "address search");
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> PartyStore {
        let mut store = PartyStore::new();
        store.add_party(Party::new(PartyId(1), "First")).unwrap();
        store
            .add_party(Party::new(PartyId(2), "Second").with_allow_edi(true))
            .unwrap();
        store
    }

    #[test]
    fn test_duplicate_party_is_rejected() {
        let mut store = sample_store();
        let result = store.add_party(Party::new(PartyId(1), "Again"));
        assert!(matches!(result, Err(Error::DuplicateParty(PartyId(1)))));
    }

    #[test]
    fn test_address_requires_known_party() {
        let mut store = sample_store();
        let result = store.add_address(Address::new(AddressId(1), PartyId(42)));
        assert!(matches!(result, Err(Error::PartyNotFound(PartyId(42)))));

        store.add_address(Address::new(AddressId(1), PartyId(1))).unwrap();
        let result = store.add_address(Address::new(AddressId(1), PartyId(2)));
        assert!(matches!(result, Err(Error::DuplicateAddress(AddressId(1)))));
    }

    #[test]
    fn test_search_identifiers_orders_by_id_and_limits() {
        let mut store = sample_store();
        store
            .create_identifier(PartyId(2), IdentifierType::Vat, "ES1")
            .unwrap();
        store
            .create_identifier(PartyId(1), IdentifierType::Vat, "ES1")
            .unwrap();

        let all = store.search_identifiers(IdentifierType::Vat, "ES1", None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].party, PartyId(2));

        let first = store.search_identifiers(IdentifierType::Vat, "ES1", Some(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].party, PartyId(2));
    }

    #[test]
    fn test_search_identifiers_matches_type_and_code() {
        let mut store = sample_store();
        store
            .create_identifier(PartyId(1), IdentifierType::EdiHead, "X1")
            .unwrap();

        assert!(store
            .search_identifiers(IdentifierType::EdiPay, "X1", None)
            .is_empty());
        assert!(store
            .search_identifiers(IdentifierType::EdiHead, "X2", None)
            .is_empty());
    }

    fn carried(id: u64, party: u64, kind: IdentifierType, code: &str) -> Identifier {
        Identifier {
            id: IdentifierId(id),
            party: PartyId(party),
            kind,
            code: code.to_string(),
        }
    }

    #[test]
    fn test_loaded_identifiers_advance_id_sequence() {
        let mut store = PartyStore::new();
        let mut party = Party::new(PartyId(5), "Loaded");
        party
            .identifiers
            .push(carried(10, 5, IdentifierType::EdiHead, "H"));
        store.add_party(party).unwrap();

        let created = store
            .create_identifier(PartyId(5), IdentifierType::EdiPay, "P")
            .unwrap();
        assert_eq!(created.id, IdentifierId(11));
    }

    #[test]
    fn test_foreign_identifier_owner_is_rejected() {
        let mut store = PartyStore::new();
        let mut party = Party::new(PartyId(5), "Loaded");
        party
            .identifiers
            .push(carried(10, 6, IdentifierType::EdiHead, "H"));

        assert!(matches!(
            store.add_party(party),
            Err(Error::IdentifierOwnerMismatch {
                identifier: IdentifierId(10),
                owner: PartyId(6),
                party: PartyId(5),
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_max_identifier_id_is_rejected_without_panic() {
        let mut store = PartyStore::new();
        let mut party = Party::new(PartyId(1), "Edge");
        party
            .identifiers
            .push(carried(u64::MAX, 1, IdentifierType::Vat, "V"));

        assert!(matches!(
            store.add_party(party),
            Err(Error::IdentifierSequenceExhausted)
        ));
        assert!(store.is_empty());

        // A rejected party leaves the sequence untouched
        store.add_party(Party::new(PartyId(2), "Next")).unwrap();
        let created = store
            .create_identifier(PartyId(2), IdentifierType::Vat, "W")
            .unwrap();
        assert_eq!(created.id, IdentifierId(0));
    }

    #[test]
    fn test_create_identifier_stops_at_end_of_sequence() {
        let mut store = PartyStore::new();
        let mut party = Party::new(PartyId(1), "Edge");
        party
            .identifiers
            .push(carried(u64::MAX - 1, 1, IdentifierType::Vat, "V"));
        store.add_party(party).unwrap();

        let result = store.create_identifier(PartyId(1), IdentifierType::EdiHead, "H");
        assert!(matches!(result, Err(Error::IdentifierSequenceExhausted)));
        assert_eq!(store.party(PartyId(1)).unwrap().identifiers.len(), 1);
    }

    #[test]
    fn test_duplicate_identifier_id_is_rejected() {
        let mut store = sample_store();
        let created = store
            .create_identifier(PartyId(1), IdentifierType::Vat, "V")
            .unwrap();

        let mut party = Party::new(PartyId(3), "Clash");
        party.identifiers.push(Identifier {
            id: created.id,
            party: PartyId(3),
            kind: IdentifierType::Vat,
            code: "W".to_string(),
        });
        assert!(matches!(
            store.add_party(party),
            Err(Error::DuplicateIdentifier(id)) if id == created.id
        ));
        assert!(store.party(PartyId(3)).is_none());
    }

    #[test]
    fn test_write_unknown_identifier_fails() {
        let mut store = sample_store();
        let result = store.write_identifier(IdentifierId(99), "X");
        assert!(matches!(result, Err(Error::IdentifierNotFound(IdentifierId(99)))));
    }

    #[test]
    fn test_edi_parties_filters_on_allow_edi() {
        let store = sample_store();
        let ids: Vec<PartyId> = store.edi_parties().map(|p| p.id).collect();
        assert_eq!(ids, vec![PartyId(2)]);
    }

    #[test]
    fn test_address_search_by_edi_ean() {
        let mut store = sample_store();
        store
            .add_address(Address::new(AddressId(2), PartyId(2)).with_edi_ean("EAN"))
            .unwrap();
        store
            .add_address(Address::new(AddressId(1), PartyId(1)).with_edi_ean("EAN"))
            .unwrap();
        store.add_address(Address::new(AddressId(3), PartyId(1))).unwrap();

        let found = store.search_addresses_by_edi_ean("EAN", Some(1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, AddressId(1));
        assert!(store.search_addresses_by_edi_ean("", None).is_empty());
    }
}
