//! Marketplace events
//!
//! Immutable records emitted once per successful write operation. Indexers
//! and dashboards rebuild galleries, sales counters and histories from them,
//! so a failed or rolled-back call never emits anything. Amounts serialize
//! as decimal strings.

use serde::{Deserialize, Serialize};
use types::amount::{as_string, Amount};
use types::ids::{Address, BookId};

/// New book listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListed {
    pub book_id: BookId,
    pub title: String,
    pub author: Address,
    #[serde(with = "as_string")]
    pub price: Amount,
}

/// Purchase settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPurchased {
    pub book_id: BookId,
    pub buyer: Address,
    pub author: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
}

/// Accrued royalties paid out to an author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyPaid {
    pub author: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdated {
    pub book_id: BookId,
    #[serde(with = "as_string")]
    pub old_price: Amount,
    #[serde(with = "as_string")]
    pub new_price: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRemoved {
    pub book_id: BookId,
    pub author: Address,
}

/// Platform fees swept to the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFeesWithdrawn {
    pub owner: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Enum wrapper for all marketplace events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MarketEvent {
    BookListed(BookListed),
    BookPurchased(BookPurchased),
    RoyaltyPaid(RoyaltyPaid),
    PriceUpdated(PriceUpdated),
    BookRemoved(BookRemoved),
    Paused { by: Address },
    Unpaused { by: Address },
    PlatformFeesWithdrawn(PlatformFeesWithdrawn),
    OwnershipTransferred(OwnershipTransferred),
}

impl MarketEvent {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            MarketEvent::BookListed(_) => "BookListed",
            MarketEvent::BookPurchased(_) => "BookPurchased",
            MarketEvent::RoyaltyPaid(_) => "RoyaltyPaid",
            MarketEvent::PriceUpdated(_) => "PriceUpdated",
            MarketEvent::BookRemoved(_) => "BookRemoved",
            MarketEvent::Paused { .. } => "Paused",
            MarketEvent::Unpaused { .. } => "Unpaused",
            MarketEvent::PlatformFeesWithdrawn(_) => "PlatformFeesWithdrawn",
            MarketEvent::OwnershipTransferred(_) => "OwnershipTransferred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_listed_serialization() {
        let event = BookListed {
            book_id: BookId::new(1),
            title: "Dune".to_string(),
            author: Address::new("alice"),
            price: 1000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: BookListed = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_market_event_tagged_json() {
        let event = MarketEvent::RoyaltyPaid(RoyaltyPaid {
            author: Address::new("alice"),
            amount: 150,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "RoyaltyPaid");
        assert_eq!(value["data"]["author"], "alice");
    }

    #[test]
    fn test_large_amounts_serialize_as_strings() {
        let amount = 10u128.pow(30);
        let event = MarketEvent::BookPurchased(BookPurchased {
            book_id: BookId::new(1),
            buyer: Address::new("bob"),
            author: Address::new("alice"),
            amount,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""amount":"1000000000000000000000000000000""#));
        let deser: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, event);

        let repriced = serde_json::to_value(MarketEvent::PriceUpdated(PriceUpdated {
            book_id: BookId::new(1),
            old_price: u128::MAX,
            new_price: 1,
        }))
        .unwrap();
        assert_eq!(
            repriced["data"]["old_price"],
            "340282366920938463463374607431768211455"
        );
        assert_eq!(repriced["data"]["new_price"], "1");
    }

    #[test]
    fn test_pause_event_round_trip() {
        let event = MarketEvent::Paused {
            by: Address::new("owner"),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, event);
        assert_eq!(deser.label(), "Paused");
    }
}
