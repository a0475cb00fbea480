//! Payment amounts in the smallest unit
//!
//! The ledger settles integers only (the chain's smallest unit, e.g. wei).
//! Decimal conversion exists for display only and never feeds back into
//! split arithmetic. Amounts cross JSON boundaries as strings.

use rust_decimal::Decimal;

use crate::errors::AmountError;

/// Integer amount in the smallest payment unit.
pub type Amount = u128;

/// Decimal places of the native coin.
pub const NATIVE_DECIMALS: u32 = 18;

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Parse a base-10 integer amount (as sent over JSON, where 128-bit numbers
/// travel as strings).
pub fn parse_amount(raw: &str) -> Result<Amount, AmountError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }
    trimmed
        .parse::<Amount>()
        .map_err(|_| AmountError::Invalid(trimmed.to_string()))
}

/// Convert a smallest-unit amount to whole-coin units.
pub fn to_units(amount: Amount, decimals: u32) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(AmountError::OutOfRange(format!("scale {}", decimals)));
    }
    let mantissa =
        i128::try_from(amount).map_err(|_| AmountError::OutOfRange(amount.to_string()))?;
    Decimal::try_from_i128_with_scale(mantissa, decimals)
        .map(|d| d.normalize())
        .map_err(|_| AmountError::OutOfRange(amount.to_string()))
}

/// Serde adapter carrying an [`Amount`] as a base-10 string.
///
/// JSON numbers above 2^53 lose precision in JavaScript clients, so every
/// amount that leaves the process goes through this.
pub mod as_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{parse_amount, Amount};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_amount(&raw).map_err(D::Error::custom)
    }
}
