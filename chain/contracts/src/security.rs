//! Shared security primitives for the marketplace ledger
//!
//! Explicit guards checked at the top of each operation: ownership, the
//! global pause flag, and the exclusive execution lock that serializes
//! mutating calls and refuses reentrant ones.

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use types::ids::Address;

use crate::errors::MarketError;

/// Platform ownership.
///
/// The owner may pause, unpause, sweep platform fees and hand ownership on.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// Transfer ownership. Returns `false` if the caller is not the owner.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> bool {
        if !self.is_owner(caller) {
            return false;
        }
        self.owner = new_owner;
        true
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

/// Composable pause modifier.
///
/// When paused, listing and purchasing must be rejected.
#[derive(Debug, Clone, Default)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    /// Create a new unpaused guard.
    pub fn new() -> Self {
        Self { paused: false }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Exclusive execution lock around a piece of ledger state.
///
/// Calls from other threads wait for the running call to finish. A call
/// from the thread already inside `enter` (a payment recipient calling
/// back while its transfer is outstanding) fails with
/// [`MarketError::Reentrancy`] instead of deadlocking.
#[derive(Debug)]
pub struct ExecutionLock<T> {
    inner: ReentrantMutex<RefCell<T>>,
}

impl<T> ExecutionLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(value)),
        }
    }

    /// Run a mutating operation with exclusive access.
    pub fn enter<R>(
        &self,
        op: impl FnOnce(&mut T) -> Result<R, MarketError>,
    ) -> Result<R, MarketError> {
        let guard = self.inner.lock();
        let mut state = guard
            .try_borrow_mut()
            .map_err(|_| MarketError::Reentrancy)?;
        op(&mut state)
    }

    /// Run a read-only projection. Refused while a mutating call on this
    /// thread is still in flight.
    pub fn read<R>(&self, op: impl FnOnce(&T) -> R) -> Result<R, MarketError> {
        let guard = self.inner.lock();
        let state = guard.try_borrow().map_err(|_| MarketError::Reentrancy)?;
        Ok(op(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // --- AccessControl tests ---

    #[test]
    fn test_access_control_owner() {
        let ac = AccessControl::new(Address::new("alice"));
        assert!(ac.is_owner(&Address::new("alice")));
        assert!(ac.is_owner(&Address::new("ALICE")));
        assert!(!ac.is_owner(&Address::new("bob")));
    }

    #[test]
    fn test_access_control_transfer_ownership() {
        let mut ac = AccessControl::new(Address::new("alice"));
        assert!(ac.transfer_ownership(&Address::new("alice"), Address::new("bob")));
        assert!(ac.is_owner(&Address::new("bob")));
        assert!(!ac.is_owner(&Address::new("alice")));
        assert_eq!(ac.owner(), &Address::new("bob"));
    }

    #[test]
    fn test_access_control_non_owner_cannot_transfer() {
        let mut ac = AccessControl::new(Address::new("alice"));
        assert!(!ac.transfer_ownership(&Address::new("eve"), Address::new("eve")));
        assert_eq!(ac.owner(), &Address::new("alice"));
    }

    // --- PauseGuard tests ---

    #[test]
    fn test_pause_guard() {
        let mut pg = PauseGuard::new();
        assert!(!pg.is_paused());
        pg.pause();
        assert!(pg.is_paused());
        pg.unpause();
        assert!(!pg.is_paused());
    }

    // --- ExecutionLock tests ---

    #[test]
    fn test_execution_lock_enter_mutates() {
        let lock = ExecutionLock::new(0u32);
        lock.enter(|n| {
            *n += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(lock.read(|n| *n).unwrap(), 1);
    }

    #[test]
    fn test_execution_lock_nested_enter_fails() {
        let lock = ExecutionLock::new(0u32);
        let nested = lock.enter(|_| Ok(lock.enter(|_| Ok(()))));
        assert_eq!(nested.unwrap(), Err(MarketError::Reentrancy));
    }

    #[test]
    fn test_execution_lock_nested_read_fails() {
        let lock = ExecutionLock::new(0u32);
        let nested = lock.enter(|_| Ok(lock.read(|n| *n)));
        assert_eq!(nested.unwrap(), Err(MarketError::Reentrancy));
    }

    #[test]
    fn test_execution_lock_released_after_error() {
        let lock = ExecutionLock::new(0u32);
        let result: Result<(), MarketError> = lock.enter(|_| Err(MarketError::Paused));
        assert_eq!(result, Err(MarketError::Paused));
        assert!(lock.enter(|_| Ok(())).is_ok(), "Should succeed after failed call");
    }

    #[test]
    fn test_execution_lock_serializes_threads() {
        let lock = Arc::new(ExecutionLock::new(0u64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        lock.enter(|n| {
                            *n += 1;
                            Ok(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(lock.read(|n| *n).unwrap(), 8000);
    }
}
