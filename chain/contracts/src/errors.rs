//! Contract-specific error types
//!
//! Error taxonomy for marketplace, configuration and payment rail failures.
//! Every `MarketError` aborts its operation with no state change.

use thiserror::Error;
use types::amount::Amount;
use types::ids::{Address, BookId};

/// Marketplace ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Book not found: {book_id}")]
    NotFound { book_id: BookId },

    #[error("Forbidden: caller lacks the required role")]
    Forbidden,

    #[error("Book already purchased by this buyer")]
    AlreadyPurchased,

    #[error("Book is no longer available")]
    Unavailable,

    #[error("Insufficient payment: required {required}, provided {provided}")]
    InsufficientPayment { required: Amount, provided: Amount },

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("Marketplace is paused")]
    Paused,

    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Arithmetic overflow in amount calculation")]
    Overflow,
}

impl MarketError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MarketError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Payment rail errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Recipient {to} rejected transfer of {amount}")]
    Rejected { to: Address, amount: Amount },

    #[error("Payment rail unavailable: {0}")]
    Unavailable(String),
}

impl From<TransferError> for MarketError {
    fn from(err: TransferError) -> Self {
        MarketError::TransferFailed {
            reason: err.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Platform fee {fee}% plus max royalty {royalty}% exceeds 100%")]
    SharesExceedTotal { fee: u8, royalty: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_error_display() {
        let err = MarketError::InsufficientPayment {
            required: 1000,
            provided: 999,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: required 1000, provided 999"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = MarketError::NotFound {
            book_id: BookId::new(7),
        };
        assert_eq!(err.to_string(), "Book not found: 7");
    }

    #[test]
    fn test_market_error_from_transfer() {
        let transfer_err = TransferError::Rejected {
            to: Address::new("mallory"),
            amount: 5,
        };
        let market_err: MarketError = transfer_err.into();
        match market_err {
            MarketError::TransferFailed { reason } => assert!(reason.contains("mallory")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::SharesExceedTotal { fee: 80, royalty: 25 };
        assert!(err.to_string().contains("80"));
    }
}
