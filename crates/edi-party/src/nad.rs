//! NAD segment qualifiers and token consumption
//!
//! A NAD line arrives already split into a tag (`NADMR`, `NADBIV`, ...) and
//! the positional tokens that follow it. The tag selects which tokens are
//! read; the tokens are read left to right through a [`TokenCursor`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Party role qualifier of a NAD segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NadQualifier {
    /// Message recipient
    #[serde(rename = "NADMR")]
    Mr,
    /// Pick-up place
    #[serde(rename = "NADPW")]
    Pw,
    /// Shipper
    #[serde(rename = "NADSH")]
    Sh,
    /// Ultimate consignee
    #[serde(rename = "NADUC")]
    Uc,
    /// Payer
    #[serde(rename = "NADPR")]
    Pr,
    /// Invoicee, followed by its VAT code
    #[serde(rename = "NADBIV")]
    Biv,
}

impl NadQualifier {
    /// Every known qualifier
    pub const ALL: [NadQualifier; 6] = [
        Self::Mr,
        Self::Pw,
        Self::Sh,
        Self::Uc,
        Self::Pr,
        Self::Biv,
    ];

    /// Segment tag as it appears on the line
    pub fn tag(self) -> &'static str {
        match self {
            Self::Mr => "NADMR",
            Self::Pw => "NADPW",
            Self::Sh => "NADSH",
            Self::Uc => "NADUC",
            Self::Pr => "NADPR",
            Self::Biv => "NADBIV",
        }
    }

    /// Whether a VAT token follows the EDI code
    pub fn carries_vat(self) -> bool {
        matches!(self, Self::Biv)
    }
}

impl fmt::Display for NadQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NadQualifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|q| q.tag() == s)
            .ok_or_else(|| Error::UnknownQualifier(s.to_string()))
    }
}

/// Left-to-right reader over an immutable token slice
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    /// Create a cursor positioned on the first token
    pub fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Consume the next token if there is one
    pub fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    /// Consume the next token, yielding an empty string past the end
    pub fn next_or_empty(&mut self) -> &'a str {
        self.next_token().unwrap_or("")
    }

    /// Tokens not yet consumed
    pub fn remaining(&self) -> &'a [String] {
        &self.tokens[self.pos..]
    }

    /// Check if every token has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
