//! Marketplace ledger: book registry, purchase settlement, royalties
//!
//! Single authoritative state machine for the book market:
//! - Listing lifecycle (list, reprice, remove)
//! - Purchase execution with platform fee / royalty / payout split
//! - Pull-payment royalty accrual and withdrawal
//! - Pause, platform fee sweep, ownership transfer
//!
//! Operations that move value write their gating state (purchase record,
//! zeroed royalty balance) first, then hand the outbound transfers to the
//! payment rail. A rail failure restores every earlier write before the
//! error is returned, and nothing is logged to history or the event stream.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};
use types::amount::Amount;
use types::book::{Book, Listing, PurchaseRecord};
use types::fee::FeeSplit;
use types::ids::{Address, BookId};

use crate::config::{MarketplaceConfig, SplitBasis};
use crate::errors::{ConfigError, MarketError};
use crate::events::{
    BookListed, BookPurchased, BookRemoved, MarketEvent, OwnershipTransferred,
    PlatformFeesWithdrawn, PriceUpdated, RoyaltyPaid,
};
use crate::history::{SalesSummary, SettlementHistory, SettlementKind, SettlementRecord};
use crate::security::{AccessControl, PauseGuard};
use crate::transfer::{PaymentRail, Transfer, TransferPurpose};

/// Identity the ledger uses as payer in its own settlement records.
pub const LEDGER_ADDRESS: &str = "book-market-ledger";

/// Outcome of a settled purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub book_id: BookId,
    pub buyer: Address,
    pub author: Address,
    pub payment: Amount,
    pub split: FeeSplit,
    /// Returned to the buyer, `payment - price`
    pub refund: Amount,
}

/// State restored if a purchase's transfers fail.
struct PurchaseRollback {
    key: (BookId, Address),
    total_sales: u64,
    author: Address,
    author_royalty: Option<Amount>,
    outstanding_royalties: Amount,
    retained: Amount,
}

/// Core marketplace ledger.
///
/// All state-changing operations check, in order:
/// 1. Pause state (listing and purchasing only)
/// 2. Existence of the referenced book
/// 3. Caller role (owner or author, where applicable)
/// 4. Operation-specific preconditions
pub struct Marketplace {
    config: MarketplaceConfig,
    /// Books by `id - 1`; ids are dense
    books: Vec<Book>,
    next_id: BookId,
    author_books: HashMap<Address, Vec<BookId>>,
    purchases: HashMap<(BookId, Address), PurchaseRecord>,
    /// Unclaimed royalties per author
    royalties: HashMap<Address, Amount>,
    outstanding_royalties: Amount,
    /// Funds held by the ledger: platform fees plus outstanding royalties
    retained: Amount,
    history: SettlementHistory,
    access_control: AccessControl,
    pause_guard: PauseGuard,
    rail: Box<dyn PaymentRail>,
    /// Emitted events log (append-only)
    events: Vec<MarketEvent>,
    ledger_address: Address,
}

impl fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marketplace")
            .field("config", &self.config)
            .field("books", &self.books.len())
            .field("retained", &self.retained)
            .field("outstanding_royalties", &self.outstanding_royalties)
            .field("paused", &self.pause_guard.is_paused())
            .field("owner", self.access_control.owner())
            .finish_non_exhaustive()
    }
}

impl Marketplace {
    /// Create a ledger with the default configuration.
    pub fn new(owner: Address, rail: Box<dyn PaymentRail>) -> Self {
        Self::build(owner, MarketplaceConfig::default(), rail)
    }

    /// Create a ledger with a custom configuration.
    pub fn with_config(
        owner: Address,
        config: MarketplaceConfig,
        rail: Box<dyn PaymentRail>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(owner, config, rail))
    }

    fn build(owner: Address, config: MarketplaceConfig, rail: Box<dyn PaymentRail>) -> Self {
        info!(
            owner = %owner,
            platform_fee_percent = config.platform_fee_percent,
            max_royalty_percent = config.max_royalty_percent,
            split_basis = ?config.split_basis,
            "Marketplace initialized"
        );
        Self {
            config,
            books: Vec::new(),
            next_id: BookId::FIRST,
            author_books: HashMap::new(),
            purchases: HashMap::new(),
            royalties: HashMap::new(),
            outstanding_royalties: 0,
            retained: 0,
            history: SettlementHistory::new(),
            access_control: AccessControl::new(owner),
            pause_guard: PauseGuard::new(),
            rail,
            events: Vec::new(),
            ledger_address: Address::new(LEDGER_ADDRESS),
        }
    }

    // ───────────────────────── Listing ─────────────────────────

    /// List a new book authored by `caller`.
    ///
    /// Emits `BookListed`.
    pub fn list_book(
        &mut self,
        caller: &Address,
        listing: Listing,
        now: i64,
    ) -> Result<BookId, MarketError> {
        self.check_not_paused()?;
        self.validate_listing(&listing)?;

        let id = self.next_id;
        let next_id = id.next().ok_or(MarketError::Overflow)?;

        let book = Book {
            id,
            title: listing.title,
            content_reference: listing.content_reference,
            description: listing.description,
            cover_reference: listing.cover_reference,
            categories: listing.categories,
            tags: listing.tags,
            price: listing.price,
            royalty_percentage: listing.royalty_percentage,
            author: caller.clone(),
            is_available: true,
            total_sales: 0,
            created_at: now,
        };

        let event = MarketEvent::BookListed(BookListed {
            book_id: id,
            title: book.title.clone(),
            author: caller.clone(),
            price: book.price,
        });

        info!(book_id = %id, author = %caller, price = %book.price, "Book listed");

        self.books.push(book);
        self.author_books.entry(caller.clone()).or_default().push(id);
        self.next_id = next_id;
        self.emit(event);
        Ok(id)
    }

    /// Change the price of a book. Author-only; allowed on removed books.
    ///
    /// Emits `PriceUpdated`.
    pub fn update_book_price(
        &mut self,
        caller: &Address,
        book_id: BookId,
        new_price: Amount,
    ) -> Result<(), MarketError> {
        let book = self.book_mut(book_id)?;
        if book.author != *caller {
            return Err(MarketError::Forbidden);
        }
        if new_price == 0 {
            return Err(MarketError::invalid("price must be positive"));
        }

        let old_price = book.price;
        book.price = new_price;

        info!(book_id = %book_id, old_price = %old_price, new_price = %new_price, "Price updated");
        self.emit(MarketEvent::PriceUpdated(PriceUpdated {
            book_id,
            old_price,
            new_price,
        }));
        Ok(())
    }

    /// Permanently withdraw a book from sale. Author-only.
    ///
    /// Returns `true` if the book was available; removing an already
    /// removed book succeeds without changing anything or emitting.
    pub fn remove_book(&mut self, caller: &Address, book_id: BookId) -> Result<bool, MarketError> {
        let book = self.book_mut(book_id)?;
        if book.author != *caller {
            return Err(MarketError::Forbidden);
        }
        if !book.is_available {
            debug!(book_id = %book_id, "Book already removed");
            return Ok(false);
        }

        book.is_available = false;
        let author = book.author.clone();

        info!(book_id = %book_id, author = %author, "Book removed");
        self.emit(MarketEvent::BookRemoved(BookRemoved { book_id, author }));
        Ok(true)
    }

    // ───────────────────────── Purchase ─────────────────────────

    /// Buy `book_id` for `caller` with an attached `payment`.
    ///
    /// Splits the payment into platform fee, royalty (credited to the
    /// author's balance) and author payout (transferred now), and refunds
    /// any amount above the price. Emits `BookPurchased`.
    pub fn purchase_book(
        &mut self,
        caller: &Address,
        book_id: BookId,
        payment: Amount,
        now: i64,
    ) -> Result<PurchaseReceipt, MarketError> {
        self.check_not_paused()?;

        let book = self.book(book_id)?;
        let key = (book_id, caller.clone());
        if self.purchases.contains_key(&key) {
            return Err(MarketError::AlreadyPurchased);
        }
        if !book.is_available {
            return Err(MarketError::Unavailable);
        }
        if payment < book.price {
            return Err(MarketError::InsufficientPayment {
                required: book.price,
                provided: payment,
            });
        }

        let price = book.price;
        let author = book.author.clone();
        let total_sales = book.total_sales;
        let new_total_sales = total_sales.checked_add(1).ok_or(MarketError::Overflow)?;

        let base = match self.config.split_basis {
            SplitBasis::Payment => payment,
            SplitBasis::Price => price,
        };
        let split = FeeSplit::compute(
            base,
            self.config.platform_fee_percent,
            book.royalty_percentage,
        )
        .ok_or(MarketError::Overflow)?;
        let refund = payment - price;

        // Every figure is computed before the first write so the only
        // failure left after mutation is the transfer itself.
        let author_royalty = self.royalties.get(&author).copied();
        let new_author_royalty = author_royalty
            .unwrap_or(0)
            .checked_add(split.royalty)
            .ok_or(MarketError::Overflow)?;
        let new_outstanding = self
            .outstanding_royalties
            .checked_add(split.royalty)
            .ok_or(MarketError::Overflow)?;
        let new_retained = self
            .retained
            .checked_add(payment)
            .ok_or(MarketError::Overflow)?
            .checked_sub(split.author_payout)
            .and_then(|r| r.checked_sub(refund))
            .filter(|r| *r >= new_outstanding)
            .ok_or_else(|| {
                warn!(
                    book_id = %book_id,
                    payment = %payment,
                    retained = %self.retained,
                    "Ledger cannot cover payout and refund"
                );
                MarketError::TransferFailed {
                    reason: "insufficient ledger funds for payout and refund".to_string(),
                }
            })?;

        let rollback = PurchaseRollback {
            key: key.clone(),
            total_sales,
            author: author.clone(),
            author_royalty,
            outstanding_royalties: self.outstanding_royalties,
            retained: self.retained,
        };

        // Gate repeat purchases before any value leaves the ledger.
        self.purchases.insert(
            key,
            PurchaseRecord {
                book_id,
                buyer: caller.clone(),
                amount_paid: payment,
                purchased_at: now,
            },
        );
        self.book_mut(book_id)?.total_sales = new_total_sales;
        self.royalties.insert(author.clone(), new_author_royalty);
        self.outstanding_royalties = new_outstanding;
        self.retained = new_retained;

        let batch = nonzero(vec![
            Transfer::new(author.clone(), split.author_payout, TransferPurpose::AuthorPayout),
            Transfer::new(caller.clone(), refund, TransferPurpose::Refund),
        ]);
        if let Err(err) = self.rail.settle(&batch) {
            warn!(book_id = %book_id, buyer = %caller, error = %err, "Purchase transfer failed, rolling back");
            self.rollback_purchase(rollback);
            return Err(err.into());
        }

        self.history
            .record_purchase(book_id, caller, &author, payment, &split, now);

        info!(
            book_id = %book_id,
            buyer = %caller,
            author = %author,
            payment = %payment,
            platform_fee = %split.platform_fee,
            royalty = %split.royalty,
            author_payout = %split.author_payout,
            refund = %refund,
            "Book purchased"
        );
        self.emit(MarketEvent::BookPurchased(BookPurchased {
            book_id,
            buyer: caller.clone(),
            author: author.clone(),
            amount: payment,
        }));

        Ok(PurchaseReceipt {
            book_id,
            buyer: caller.clone(),
            author,
            payment,
            split,
            refund,
        })
    }

    fn rollback_purchase(&mut self, rollback: PurchaseRollback) {
        let book_id = rollback.key.0;
        self.purchases.remove(&rollback.key);
        if let Ok(book) = self.book_mut(book_id) {
            book.total_sales = rollback.total_sales;
        }
        match rollback.author_royalty {
            Some(balance) => {
                self.royalties.insert(rollback.author, balance);
            }
            None => {
                self.royalties.remove(&rollback.author);
            }
        }
        self.outstanding_royalties = rollback.outstanding_royalties;
        self.retained = rollback.retained;
    }

    // ───────────────────────── Royalties ─────────────────────────

    /// Pay the caller's whole royalty balance out. Allowed while paused.
    ///
    /// Emits `RoyaltyPaid`.
    pub fn withdraw_royalties(&mut self, caller: &Address, now: i64) -> Result<Amount, MarketError> {
        let amount = self.royalties.get(caller).copied().unwrap_or(0);
        if amount == 0 {
            return Err(MarketError::NothingToWithdraw);
        }

        let retained = self.retained;
        let outstanding = self.outstanding_royalties;
        let new_retained = retained.checked_sub(amount).ok_or(MarketError::Overflow)?;
        let new_outstanding = outstanding.checked_sub(amount).ok_or(MarketError::Overflow)?;

        // Zero first: the balance is gone before the recipient sees value.
        self.royalties.remove(caller);
        self.retained = new_retained;
        self.outstanding_royalties = new_outstanding;

        let batch = [Transfer::new(caller.clone(), amount, TransferPurpose::Royalty)];
        if let Err(err) = self.rail.settle(&batch) {
            warn!(author = %caller, amount = %amount, error = %err, "Royalty transfer failed, restoring balance");
            self.royalties.insert(caller.clone(), amount);
            self.retained = retained;
            self.outstanding_royalties = outstanding;
            return Err(err.into());
        }

        self.history.record_withdrawal(
            SettlementKind::RoyaltyWithdrawal,
            &self.ledger_address,
            caller,
            amount,
            now,
        );

        info!(author = %caller, amount = %amount, "Royalties withdrawn");
        self.emit(MarketEvent::RoyaltyPaid(RoyaltyPaid {
            author: caller.clone(),
            amount,
        }));
        Ok(amount)
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Stop new listings and purchases. Owner-only.
    pub fn pause(&mut self, caller: &Address) -> Result<(), MarketError> {
        self.check_owner(caller)?;
        self.pause_guard.pause();
        info!(by = %caller, "Marketplace paused");
        self.emit(MarketEvent::Paused { by: caller.clone() });
        Ok(())
    }

    /// Resume listings and purchases. Owner-only.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), MarketError> {
        self.check_owner(caller)?;
        self.pause_guard.unpause();
        info!(by = %caller, "Marketplace unpaused");
        self.emit(MarketEvent::Unpaused { by: caller.clone() });
        Ok(())
    }

    /// Sweep retained funds not owed to authors to the owner. Owner-only.
    ///
    /// Emits `PlatformFeesWithdrawn`.
    pub fn withdraw_platform_fees(&mut self, caller: &Address, now: i64) -> Result<Amount, MarketError> {
        self.check_owner(caller)?;

        let amount = self.platform_fee_balance();
        if amount == 0 {
            return Err(MarketError::NothingToWithdraw);
        }

        let retained = self.retained;
        self.retained = self.outstanding_royalties;

        let batch = [Transfer::new(caller.clone(), amount, TransferPurpose::PlatformFee)];
        if let Err(err) = self.rail.settle(&batch) {
            warn!(owner = %caller, amount = %amount, error = %err, "Platform fee transfer failed, restoring balance");
            self.retained = retained;
            return Err(err.into());
        }

        self.history.record_withdrawal(
            SettlementKind::PlatformFeeWithdrawal,
            &self.ledger_address,
            caller,
            amount,
            now,
        );

        info!(owner = %caller, amount = %amount, "Platform fees withdrawn");
        self.emit(MarketEvent::PlatformFeesWithdrawn(PlatformFeesWithdrawn {
            owner: caller.clone(),
            amount,
        }));
        Ok(amount)
    }

    /// Hand platform ownership to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), MarketError> {
        if !self
            .access_control
            .transfer_ownership(caller, new_owner.clone())
        {
            warn!(caller = %caller, "Rejected ownership transfer from non-owner");
            return Err(MarketError::Forbidden);
        }

        info!(previous_owner = %caller, new_owner = %new_owner, "Ownership transferred");
        self.emit(MarketEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: caller.clone(),
            new_owner,
        }));
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn get_book(&self, book_id: BookId) -> Result<&Book, MarketError> {
        self.book(book_id)
    }

    /// Ids listed by `author`, in listing order. Empty for unknown authors.
    pub fn get_author_books(&self, author: &Address) -> &[BookId] {
        self.author_books
            .get(author)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn author_book_count(&self, author: &Address) -> usize {
        self.get_author_books(author).len()
    }

    pub fn has_purchased(&self, buyer: &Address, book_id: BookId) -> Result<bool, MarketError> {
        self.book(book_id)?;
        Ok(self.purchases.contains_key(&(book_id, buyer.clone())))
    }

    pub fn purchase_record(&self, buyer: &Address, book_id: BookId) -> Option<&PurchaseRecord> {
        self.purchases.get(&(book_id, buyer.clone()))
    }

    /// Unclaimed royalties of `author`; zero for unknown authors.
    pub fn get_author_royalties(&self, author: &Address) -> Amount {
        self.royalties.get(author).copied().unwrap_or(0)
    }

    /// A page of books still for sale, in id order.
    pub fn list_available_books(&self, offset: usize, limit: usize) -> Vec<Book> {
        debug!(offset, limit, "Listing available books");
        self.books
            .iter()
            .filter(|b| b.is_available)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Content locator of a book, released to its author and its buyers.
    ///
    /// Buyers keep access after the book is removed from sale.
    pub fn content_for(&self, caller: &Address, book_id: BookId) -> Result<&str, MarketError> {
        let book = self.book(book_id)?;
        if book.author != *caller && !self.purchases.contains_key(&(book_id, caller.clone())) {
            debug!(book_id = %book_id, caller = %caller, "Content access denied");
            return Err(MarketError::Forbidden);
        }
        Ok(&book.content_reference)
    }

    /// Sales totals for a book. Author-only.
    pub fn book_sales(&self, caller: &Address, book_id: BookId) -> Result<SalesSummary, MarketError> {
        let book = self.book(book_id)?;
        if book.author != *caller {
            return Err(MarketError::Forbidden);
        }
        Ok(self.history.sales(book_id))
    }

    /// Settlement records where `address` paid or was paid.
    pub fn settlements_for(&self, address: &Address) -> Vec<SettlementRecord> {
        self.history.for_address(address)
    }

    pub fn is_paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    pub fn owner(&self) -> &Address {
        self.access_control.owner()
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Funds held by the ledger.
    pub fn retained_balance(&self) -> Amount {
        self.retained
    }

    pub fn total_outstanding_royalties(&self) -> Amount {
        self.outstanding_royalties
    }

    /// Retained funds not earmarked for authors.
    pub fn platform_fee_balance(&self) -> Amount {
        self.retained.saturating_sub(self.outstanding_royalties)
    }

    /// Number of books ever listed, removed ones included.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Events not yet drained.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// A window of the pending event log, oldest first.
    pub fn events_page(&self, offset: usize, limit: usize) -> &[MarketEvent] {
        let start = offset.min(self.events.len());
        let end = start.saturating_add(limit).min(self.events.len());
        &self.events[start..end]
    }

    /// Hand the pending events to an indexer and clear the log. Owner-only.
    pub fn take_events(&mut self, caller: &Address) -> Result<Vec<MarketEvent>, MarketError> {
        self.check_owner(caller)?;
        let events = self.drain_events();
        info!(by = %caller, count = events.len(), "Event log drained");
        Ok(events)
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: MarketEvent) {
        debug!(event = event.label(), "Event emitted");
        self.events.push(event);
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    fn check_not_paused(&self) -> Result<(), MarketError> {
        if self.pause_guard.is_paused() {
            return Err(MarketError::Paused);
        }
        Ok(())
    }

    fn check_owner(&self, caller: &Address) -> Result<(), MarketError> {
        if !self.access_control.is_owner(caller) {
            warn!(caller = %caller, "Rejected owner-only call");
            return Err(MarketError::Forbidden);
        }
        Ok(())
    }

    fn validate_listing(&self, listing: &Listing) -> Result<(), MarketError> {
        if listing.title.trim().is_empty() {
            return Err(MarketError::invalid("title must not be empty"));
        }
        if listing.content_reference.trim().is_empty() {
            return Err(MarketError::invalid("content reference must not be empty"));
        }
        if listing.price == 0 {
            return Err(MarketError::invalid("price must be positive"));
        }
        if listing.royalty_percentage > self.config.max_royalty_percent {
            return Err(MarketError::invalid(format!(
                "royalty {}% exceeds maximum {}%",
                listing.royalty_percentage, self.config.max_royalty_percent
            )));
        }
        if matches!(&listing.description, Some(d) if d.trim().is_empty()) {
            return Err(MarketError::invalid("description must not be blank"));
        }
        if matches!(&listing.cover_reference, Some(c) if c.trim().is_empty()) {
            return Err(MarketError::invalid("cover reference must not be blank"));
        }
        if listing.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(MarketError::invalid("categories must not be blank"));
        }
        if listing.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(MarketError::invalid("tags must not be blank"));
        }
        Ok(())
    }

    fn index_of(book_id: BookId) -> Option<usize> {
        if book_id.is_none() {
            return None;
        }
        usize::try_from(book_id.value() - 1).ok()
    }

    fn book(&self, book_id: BookId) -> Result<&Book, MarketError> {
        Self::index_of(book_id)
            .and_then(|i| self.books.get(i))
            .ok_or(MarketError::NotFound { book_id })
    }

    fn book_mut(&mut self, book_id: BookId) -> Result<&mut Book, MarketError> {
        Self::index_of(book_id)
            .and_then(|i| self.books.get_mut(i))
            .ok_or(MarketError::NotFound { book_id })
    }
}

fn nonzero(batch: Vec<Transfer>) -> Vec<Transfer> {
    batch.into_iter().filter(|t| t.amount > 0).collect()
}
