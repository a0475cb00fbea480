//! Identifier types for marketplace entities
//!
//! Book ids are dense, sequential integers starting at 1; 0 is reserved as
//! the "does not exist" sentinel. Addresses identify buyers, authors and the
//! platform owner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AddressError;

/// Unique identifier for a listed book
///
/// Assigned by the ledger from a monotonically increasing counter and never
/// reused, including for removed books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    /// Sentinel id that never refers to a book.
    pub const NONE: BookId = BookId(0);

    /// The first id handed out by a fresh ledger.
    pub const FIRST: BookId = BookId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// True for the reserved sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// The id following this one, or `None` on counter exhaustion.
    pub fn next(&self) -> Option<BookId> {
        self.0.checked_add(1).map(BookId)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BookId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Account address (buyer, author or platform owner)
///
/// Stored lowercased so comparisons are case-insensitive, matching how the
/// wallet layer reports checksummed and plain hex addresses interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Byte length of a wallet address.
    pub const BYTE_LEN: usize = 20;

    /// Wrap an identity string without format checks.
    ///
    /// The ledger trusts identities handed to it by the wallet layer; use
    /// [`Address::parse`] at untrusted boundaries.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_ascii_lowercase())
    }

    /// Parse a `0x`-prefixed, 20-byte hex address.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(trimmed.to_string()))?;

        let bytes = hex::decode(body).map_err(|_| AddressError::InvalidHex(trimmed.to_string()))?;
        if bytes.len() != Self::BYTE_LEN {
            return Err(AddressError::InvalidLength {
                expected: Self::BYTE_LEN,
                actual: bytes.len(),
            });
        }

        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
