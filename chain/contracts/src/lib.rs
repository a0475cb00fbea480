//! Marketplace Ledger for Book Sales & Royalties
//!
//! This crate implements the settlement layer of the book market: listings,
//! one-time purchases with an automatic fee/royalty/payout split, pull-based
//! royalty withdrawal and owner administration.
//!
//! # Modules
//! - `events`: Ledger events (listing, purchase, royalty, admin)
//! - `errors`: Ledger, payment rail and configuration errors
//! - `security`: Access control, pause guard, exclusive execution lock
//! - `config`: Fee percentages and split basis
//! - `transfer`: Outbound payment rail and an in-memory implementation
//! - `history`: Settlement records and per-book sales totals
//! - `marketplace`: The ledger state machine
//! - `shared`: Thread-safe handle used by services

pub mod config;
pub mod errors;
pub mod events;
pub mod history;
pub mod marketplace;
pub mod security;
pub mod shared;
pub mod transfer;

pub use marketplace::{Marketplace, PurchaseReceipt};
pub use shared::SharedMarketplace;

/// Ledger interface version, frozen after release
pub const LEDGER_ABI_VERSION: &str = "1.0.0";
