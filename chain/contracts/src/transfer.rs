//! Payment rail: outbound value transfers
//!
//! The ledger never moves value itself; it hands a batch of transfers to a
//! [`PaymentRail`] after its own state writes are done. A rail applies a
//! batch all-or-nothing, so a failed refund also undoes the author payout
//! that preceded it in the same batch.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use types::amount::Amount;
use types::ids::Address;

use crate::errors::TransferError;

/// Why value is leaving the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPurpose {
    AuthorPayout,
    Refund,
    Royalty,
    PlatformFee,
}

/// A single outbound transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: Address,
    pub amount: Amount,
    pub purpose: TransferPurpose,
}

impl Transfer {
    pub fn new(to: Address, amount: Amount, purpose: TransferPurpose) -> Self {
        Self {
            to,
            amount,
            purpose,
        }
    }
}

/// Outbound side of the wallet layer.
///
/// `settle` must apply every transfer in `batch` or none of them.
/// Implementations may call arbitrary recipient code, including code that
/// tries to call back into the marketplace.
///
/// `settle` runs while the ledger lock is held and may block. Async callers
/// must reach the ledger from a blocking thread, never an executor worker.
pub trait PaymentRail: Send {
    fn settle(&mut self, batch: &[Transfer]) -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
struct RailState {
    balances: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
    settled: Vec<Transfer>,
}

/// In-memory rail crediting recipients in a shared map.
///
/// Clones share state, so a caller can keep a handle for inspection after
/// boxing one into the ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRail {
    state: Arc<Mutex<RailState>>,
}

impl InMemoryRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total received by `address` through this rail.
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.with_state(|s| s.balances.get(address).copied().unwrap_or(0))
    }

    /// Make every transfer to `address` fail until [`InMemoryRail::accept`].
    pub fn reject(&self, address: Address) {
        self.with_state(|s| {
            s.rejecting.insert(address);
        });
    }

    pub fn accept(&self, address: &Address) {
        self.with_state(|s| {
            s.rejecting.remove(address);
        });
    }

    /// Every transfer applied so far, in order.
    pub fn settled(&self) -> Vec<Transfer> {
        self.with_state(|s| s.settled.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RailState) -> R) -> R {
        // A panic while holding the lock cannot leave a half-applied batch,
        // so a poisoned map is still consistent.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }
}

impl PaymentRail for InMemoryRail {
    fn settle(&mut self, batch: &[Transfer]) -> Result<(), TransferError> {
        self.with_state(|s| {
            if let Some(bad) = batch.iter().find(|t| s.rejecting.contains(&t.to)) {
                return Err(TransferError::Rejected {
                    to: bad.to.clone(),
                    amount: bad.amount,
                });
            }

            // Validate the whole batch before touching any balance.
            let mut updated: HashMap<Address, Amount> = HashMap::new();
            for t in batch {
                let current = updated
                    .get(&t.to)
                    .copied()
                    .unwrap_or_else(|| s.balances.get(&t.to).copied().unwrap_or(0));
                let next = current.checked_add(t.amount).ok_or_else(|| {
                    TransferError::Rejected {
                        to: t.to.clone(),
                        amount: t.amount,
                    }
                })?;
                updated.insert(t.to.clone(), next);
            }

            s.balances.extend(updated);
            s.settled.extend(batch.iter().cloned());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payout(to: &str, amount: Amount) -> Transfer {
        Transfer::new(Address::new(to), amount, TransferPurpose::AuthorPayout)
    }

    #[test]
    fn test_settle_credits_recipients() {
        let mut rail = InMemoryRail::new();
        rail.settle(&[payout("alice", 800), payout("bob", 200), payout("alice", 50)])
            .unwrap();
        assert_eq!(rail.balance_of(&Address::new("alice")), 850);
        assert_eq!(rail.balance_of(&Address::new("bob")), 200);
        assert_eq!(rail.settled().len(), 3);
    }

    #[test]
    fn test_settle_is_all_or_nothing() {
        let mut rail = InMemoryRail::new();
        rail.reject(Address::new("bob"));
        let result = rail.settle(&[payout("alice", 800), payout("bob", 200)]);
        assert!(matches!(result, Err(TransferError::Rejected { .. })));
        assert_eq!(rail.balance_of(&Address::new("alice")), 0);
        assert!(rail.settled().is_empty());
    }

    #[test]
    fn test_accept_after_reject() {
        let mut rail = InMemoryRail::new();
        rail.reject(Address::new("bob"));
        rail.accept(&Address::new("bob"));
        assert!(rail.settle(&[payout("bob", 1)]).is_ok());
    }

    #[test]
    fn test_settle_overflow_rejected() {
        let mut rail = InMemoryRail::new();
        rail.settle(&[payout("alice", u128::MAX)]).unwrap();
        let result = rail.settle(&[payout("alice", 1)]);
        assert!(result.is_err());
        assert_eq!(rail.balance_of(&Address::new("alice")), u128::MAX);
    }

    #[test]
    fn test_clones_share_state() {
        let rail = InMemoryRail::new();
        let mut boxed: Box<dyn PaymentRail> = Box::new(rail.clone());
        boxed.settle(&[payout("alice", 5)]).unwrap();
        assert_eq!(rail.balance_of(&Address::new("alice")), 5);
    }
}
