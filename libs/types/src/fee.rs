//! Sale proceeds split
//!
//! Every sale divides its base amount three ways: the platform fee, the
//! author's royalty (accrued, withdrawn later) and the author's immediate
//! payout (the remainder). Shares use floor division, so rounding dust
//! always lands in the payout.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Platform fee taken on every sale, in percent.
pub const PLATFORM_FEE_PERCENT: u8 = 10;

/// Largest royalty an author may set at listing time, in percent.
pub const MAX_ROYALTY_PERCENT: u8 = 25;

/// Percentages are whole numbers out of this.
pub const PERCENT_DENOMINATOR: u8 = 100;

/// Share of a sale assigned to each party.
///
/// Invariant: `platform_fee + royalty + author_payout == base`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub base: Amount,
    pub platform_fee: Amount,
    pub royalty: Amount,
    pub author_payout: Amount,
}

impl FeeSplit {
    /// Split `base` using the given fee and royalty percentages.
    ///
    /// Returns `None` if the percentages together exceed 100 or the
    /// multiplication overflows.
    pub fn compute(base: Amount, fee_percent: u8, royalty_percent: u8) -> Option<Self> {
        if u16::from(fee_percent) + u16::from(royalty_percent) > u16::from(PERCENT_DENOMINATOR) {
            return None;
        }

        let platform_fee = percent_of(base, fee_percent)?;
        let royalty = percent_of(base, royalty_percent)?;
        let author_payout = base.checked_sub(platform_fee)?.checked_sub(royalty)?;

        Some(Self {
            base,
            platform_fee,
            royalty,
            author_payout,
        })
    }

    /// Check the conservation invariant.
    pub fn is_balanced(&self) -> bool {
        self.platform_fee
            .checked_add(self.royalty)
            .and_then(|sum| sum.checked_add(self.author_payout))
            == Some(self.base)
    }
}

/// `floor(amount * percent / 100)` with overflow detection.
pub fn percent_of(amount: Amount, percent: u8) -> Option<Amount> {
    amount
        .checked_mul(Amount::from(percent))
        .map(|scaled| scaled / Amount::from(PERCENT_DENOMINATOR))
}
