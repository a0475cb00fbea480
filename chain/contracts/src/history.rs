//! Settlement history and per-book sales statistics
//!
//! Append-only record of value movements, written only after an operation
//! has fully succeeded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::amount::{as_string, Amount};
use types::fee::FeeSplit;
use types::ids::{Address, BookId};

/// Kind of value movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementKind {
    Purchase,
    RoyaltyWithdrawal,
    PlatformFeeWithdrawal,
}

/// One entry of the settlement history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Position in the history, starting at 1
    pub sequence: u64,
    pub kind: SettlementKind,
    pub book_id: Option<BookId>,
    pub payer: Address,
    pub payee: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
    pub timestamp: i64,
}

/// Running sales totals for one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: u64,
    /// Sum of payments attached to purchases, before refunds
    #[serde(with = "as_string")]
    pub total_revenue: Amount,
    #[serde(with = "as_string")]
    pub total_royalties: Amount,
    #[serde(with = "as_string")]
    pub total_platform_fees: Amount,
}

#[derive(Debug, Default)]
pub struct SettlementHistory {
    records: Vec<SettlementRecord>,
    sales: HashMap<BookId, SalesSummary>,
}

impl SettlementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settled purchase and fold it into the book's totals.
    ///
    /// Totals saturate; they are reporting figures and never gate value.
    pub fn record_purchase(
        &mut self,
        book_id: BookId,
        buyer: &Address,
        author: &Address,
        payment: Amount,
        split: &FeeSplit,
        timestamp: i64,
    ) {
        let summary = self.sales.entry(book_id).or_default();
        summary.total_sales = summary.total_sales.saturating_add(1);
        summary.total_revenue = summary.total_revenue.saturating_add(payment);
        summary.total_royalties = summary.total_royalties.saturating_add(split.royalty);
        summary.total_platform_fees = summary
            .total_platform_fees
            .saturating_add(split.platform_fee);

        self.push(
            SettlementKind::Purchase,
            Some(book_id),
            buyer.clone(),
            author.clone(),
            payment,
            timestamp,
        );
    }

    /// Record a payout from the ledger itself to `payee`.
    pub fn record_withdrawal(
        &mut self,
        kind: SettlementKind,
        ledger: &Address,
        payee: &Address,
        amount: Amount,
        timestamp: i64,
    ) {
        self.push(kind, None, ledger.clone(), payee.clone(), amount, timestamp);
    }

    /// Records where `address` paid or was paid, oldest first.
    pub fn for_address(&self, address: &Address) -> Vec<SettlementRecord> {
        self.records
            .iter()
            .filter(|r| r.payer == *address || r.payee == *address)
            .cloned()
            .collect()
    }

    pub fn sales(&self, book_id: BookId) -> SalesSummary {
        self.sales.get(&book_id).copied().unwrap_or_default()
    }

    fn push(
        &mut self,
        kind: SettlementKind,
        book_id: Option<BookId>,
        payer: Address,
        payee: Address,
        amount: Amount,
        timestamp: i64,
    ) {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(SettlementRecord {
            sequence,
            kind,
            book_id,
            payer,
            payee,
            amount,
            timestamp,
        });
    }
}
