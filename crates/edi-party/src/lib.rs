#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # edi-party
//!
//! Party EDI identifiers, NAD segment decoding, and supplier resolution.
//!
//! This crate extends a party/address model with EDI identifier codes and
//! turns pre-tokenized NAD (Name and Address) lines into supplier records
//! that are matched against known parties and addresses.
//!
//! ## Example Usage
//!
//! ```rust
//! use edi_party::{
//!     IdentifierRegistry, IdentifierType, NadQualifier, Party, PartyId, PartyResolver, PartyStore,
//!     SupplierEdiRecord,
//! };
//!
//! let mut store = PartyStore::new();
//! store.add_party(Party::new(PartyId(1), "Acme Supplies")).unwrap();
//! store
//!     .upsert_identifier(PartyId(1), IdentifierType::EdiHead, "8400000000017")
//!     .unwrap();
//!
//! let tokens = vec!["8400000000017".to_string()];
//! let mut record = SupplierEdiRecord::decode(NadQualifier::Mr, &tokens);
//!
//! PartyResolver::new(&store).resolve(&mut record);
//! assert_eq!(record.party, Some(PartyId(1)));
//! ```

/// Identifier types, identifiers, and the getter/setter helpers.
pub mod identifier;
/// Party and address records.
pub mod party;
/// Registry traits and the in-memory party store.
pub mod registry;
/// NAD qualifiers and the token cursor.
pub mod nad;
/// Supplier records decoded from NAD segments and their resolution.
pub mod supplier;
/// Runtime configuration.
pub mod config;
/// Serializable registry snapshots.
pub mod snapshot;

pub use config::PartyEdiConfig;
pub use identifier::{Identifier, IdentifierId, IdentifierType, identifier_code, set_identifier_code};
pub use nad::{NadQualifier, TokenCursor};
pub use party::{Address, AddressId, Party, PartyId};
pub use registry::{AddressRegistry, IdentifierRegistry, PartyStore};
pub use snapshot::{IdentifierEntry, PartyEntry, RegistrySnapshot};
pub use supplier::{PartyMatch, PartyResolver, Resolution, SupplierEdiRecord};

use thiserror::Error;

/// Errors raised at the edges of the party EDI model.
///
/// Missing data during decoding or resolution is never an error; these
/// variants cover bad tags, bad registry state, and I/O.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown NAD qualifier: {0}")]
    UnknownQualifier(String),

    #[error("Unknown identifier type: {0}")]
    UnknownIdentifierType(String),

    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    #[error("Identifier not found: {0}")]
    IdentifierNotFound(IdentifierId),

    #[error("Identifier {identifier} belongs to party {owner}, not {party}")]
    IdentifierOwnerMismatch {
        identifier: IdentifierId,
        owner: PartyId,
        party: PartyId,
    },

    #[error("Identifier id sequence exhausted")]
    IdentifierSequenceExhausted,

    #[error("Duplicate identifier id: {0}")]
    DuplicateIdentifier(IdentifierId),

    #[error("Duplicate party id: {0}")]
    DuplicateParty(PartyId),

    #[error("Duplicate address id: {0}")]
    DuplicateAddress(AddressId),

    #[error("Field '{field}' is too long: {actual} characters (max {max})")]
    FieldTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a field-length error for the named field.
    pub fn field_too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::FieldTooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Build an invalid-format error with parser context.
    pub fn invalid_format(context: &str, message: impl std::fmt::Display) -> Self {
        Self::InvalidFormat(format!("{context}: {message}"))
    }
}

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;
