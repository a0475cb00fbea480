//! Error types for shared marketplace types
//!
//! Parsing and conversion failures; ledger errors live in the contracts crate.

use thiserror::Error;

/// Address parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("Address is not valid hex: {0}")]
    InvalidHex(String),

    #[error("Address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Amount parsing and conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount is negative: {0}")]
    Negative(String),

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}
