//! Thread-safe handle to a marketplace ledger
//!
//! Every call runs under the ledger's [`ExecutionLock`]: calls from other
//! threads queue, and a call made from inside a running operation (a
//! payment recipient re-entering through a rail) is refused with
//! [`MarketError::Reentrancy`].

use std::sync::Arc;
use types::amount::Amount;
use types::book::{Book, Listing, PurchaseRecord};
use types::ids::{Address, BookId};

use crate::config::MarketplaceConfig;
use crate::errors::MarketError;
use crate::events::MarketEvent;
use crate::history::{SalesSummary, SettlementRecord};
use crate::marketplace::{Marketplace, PurchaseReceipt};
use crate::security::ExecutionLock;

/// Ledger balances at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub retained: Amount,
    pub outstanding_royalties: Amount,
    pub platform_fees: Amount,
}

/// Cloneable, `Send + Sync` handle over one [`Marketplace`].
#[derive(Debug, Clone)]
pub struct SharedMarketplace {
    inner: Arc<ExecutionLock<Marketplace>>,
}

impl SharedMarketplace {
    pub fn new(market: Marketplace) -> Self {
        Self {
            inner: Arc::new(ExecutionLock::new(market)),
        }
    }

    // --- Writes ---

    pub fn list_book(&self, caller: &Address, listing: Listing, now: i64) -> Result<BookId, MarketError> {
        self.inner.enter(|m| m.list_book(caller, listing, now))
    }

    pub fn purchase_book(
        &self,
        caller: &Address,
        book_id: BookId,
        payment: Amount,
        now: i64,
    ) -> Result<PurchaseReceipt, MarketError> {
        self.inner
            .enter(|m| m.purchase_book(caller, book_id, payment, now))
    }

    pub fn withdraw_royalties(&self, caller: &Address, now: i64) -> Result<Amount, MarketError> {
        self.inner.enter(|m| m.withdraw_royalties(caller, now))
    }

    pub fn update_book_price(
        &self,
        caller: &Address,
        book_id: BookId,
        new_price: Amount,
    ) -> Result<(), MarketError> {
        self.inner
            .enter(|m| m.update_book_price(caller, book_id, new_price))
    }

    pub fn remove_book(&self, caller: &Address, book_id: BookId) -> Result<bool, MarketError> {
        self.inner.enter(|m| m.remove_book(caller, book_id))
    }

    pub fn pause(&self, caller: &Address) -> Result<(), MarketError> {
        self.inner.enter(|m| m.pause(caller))
    }

    pub fn unpause(&self, caller: &Address) -> Result<(), MarketError> {
        self.inner.enter(|m| m.unpause(caller))
    }

    pub fn withdraw_platform_fees(&self, caller: &Address, now: i64) -> Result<Amount, MarketError> {
        self.inner.enter(|m| m.withdraw_platform_fees(caller, now))
    }

    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<(), MarketError> {
        self.inner.enter(|m| m.transfer_ownership(caller, new_owner))
    }

    /// Hand the pending events to an indexer. Owner-only.
    pub fn take_events(&self, caller: &Address) -> Result<Vec<MarketEvent>, MarketError> {
        self.inner.enter(|m| m.take_events(caller))
    }

    // --- Reads ---

    pub fn get_book(&self, book_id: BookId) -> Result<Book, MarketError> {
        self.inner.read(|m| m.get_book(book_id).cloned())?
    }

    pub fn get_author_books(&self, author: &Address) -> Result<Vec<BookId>, MarketError> {
        self.inner.read(|m| m.get_author_books(author).to_vec())
    }

    pub fn author_book_count(&self, author: &Address) -> Result<usize, MarketError> {
        self.inner.read(|m| m.author_book_count(author))
    }

    pub fn has_purchased(&self, buyer: &Address, book_id: BookId) -> Result<bool, MarketError> {
        self.inner.read(|m| m.has_purchased(buyer, book_id))?
    }

    pub fn purchase_record(
        &self,
        buyer: &Address,
        book_id: BookId,
    ) -> Result<Option<PurchaseRecord>, MarketError> {
        self.inner
            .read(|m| m.purchase_record(buyer, book_id).cloned())
    }

    pub fn get_author_royalties(&self, author: &Address) -> Result<Amount, MarketError> {
        self.inner.read(|m| m.get_author_royalties(author))
    }

    pub fn list_available_books(&self, offset: usize, limit: usize) -> Result<Vec<Book>, MarketError> {
        self.inner.read(|m| m.list_available_books(offset, limit))
    }

    pub fn content_for(&self, caller: &Address, book_id: BookId) -> Result<String, MarketError> {
        self.inner
            .read(|m| m.content_for(caller, book_id).map(str::to_owned))?
    }

    pub fn book_sales(&self, caller: &Address, book_id: BookId) -> Result<SalesSummary, MarketError> {
        self.inner.read(|m| m.book_sales(caller, book_id))?
    }

    pub fn settlements_for(&self, address: &Address) -> Result<Vec<SettlementRecord>, MarketError> {
        self.inner.read(|m| m.settlements_for(address))
    }

    pub fn is_paused(&self) -> Result<bool, MarketError> {
        self.inner.read(|m| m.is_paused())
    }

    pub fn owner(&self) -> Result<Address, MarketError> {
        self.inner.read(|m| m.owner().clone())
    }

    pub fn config(&self) -> Result<MarketplaceConfig, MarketError> {
        self.inner.read(|m| m.config().clone())
    }

    pub fn balances(&self) -> Result<Balances, MarketError> {
        self.inner.read(|m| Balances {
            retained: m.retained_balance(),
            outstanding_royalties: m.total_outstanding_royalties(),
            platform_fees: m.platform_fee_balance(),
        })
    }

    pub fn events_page(&self, offset: usize, limit: usize) -> Result<Vec<MarketEvent>, MarketError> {
        self.inner.read(|m| m.events_page(offset, limit).to_vec())
    }

    pub fn event_count(&self) -> Result<usize, MarketError> {
        self.inner.read(|m| m.event_count())
    }
}
