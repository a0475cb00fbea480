//! Types library for the book marketplace
//!
//! Shared type definitions used by the marketplace ledger and the gateway.
//! Amounts are integers in the smallest payment unit; percentages are whole
//! numbers out of 100.
//!
//! # Modules
//! - `ids`: Identifiers (BookId, Address)
//! - `amount`: Smallest-unit amounts and decimal display conversion
//! - `book`: Book listing and purchase records
//! - `fee`: Platform fee / royalty / payout split
//! - `errors`: Error taxonomy for parsing and conversion

pub mod amount;
pub mod book;
pub mod errors;
pub mod fee;
pub mod ids;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amount::*;
    pub use crate::book::*;
    pub use crate::errors::*;
    pub use crate::fee::*;
    pub use crate::ids::*;
}
