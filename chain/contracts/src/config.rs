//! Ledger configuration

use serde::{Deserialize, Serialize};
use types::fee::{MAX_ROYALTY_PERCENT, PERCENT_DENOMINATOR, PLATFORM_FEE_PERCENT};

use crate::errors::ConfigError;

/// Amount a sale's split is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitBasis {
    /// The full attached payment, overpayment included. Overpayers inflate
    /// every share before the excess is refunded.
    #[default]
    Payment,
    /// The listed price; overpayment is refunded untouched.
    Price,
}

/// Marketplace ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Platform share of every sale, percent
    pub platform_fee_percent: u8,
    /// Upper bound on an author's royalty at listing time, percent
    pub max_royalty_percent: u8,
    pub split_basis: SplitBasis,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            platform_fee_percent: PLATFORM_FEE_PERCENT,
            max_royalty_percent: MAX_ROYALTY_PERCENT,
            split_basis: SplitBasis::Payment,
        }
    }
}

impl MarketplaceConfig {
    /// Fee plus the largest royalty must leave something for the author.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = u16::from(self.platform_fee_percent) + u16::from(self.max_royalty_percent);
        if total > u16::from(PERCENT_DENOMINATOR) {
            return Err(ConfigError::SharesExceedTotal {
                fee: self.platform_fee_percent,
                royalty: self.max_royalty_percent,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketplaceConfig::default();
        assert_eq!(config.platform_fee_percent, 10);
        assert_eq!(config.max_royalty_percent, 25);
        assert_eq!(config.split_basis, SplitBasis::Payment);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_oversized_shares() {
        let config = MarketplaceConfig {
            platform_fee_percent: 80,
            max_royalty_percent: 25,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SharesExceedTotal { fee: 80, royalty: 25 })
        );
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: MarketplaceConfig =
            serde_json::from_str(r#"{"split_basis":"price"}"#).unwrap();
        assert_eq!(config.split_basis, SplitBasis::Price);
        assert_eq!(config.platform_fee_percent, 10);
    }
}
