use crate::error::AppError;
use contracts::config::MarketplaceConfig;
use contracts::errors::{ConfigError, MarketError};
use contracts::marketplace::Marketplace;
use contracts::shared::SharedMarketplace;
use contracts::transfer::InMemoryRail;
use types::ids::Address;

#[derive(Clone)]
pub struct AppState {
    pub market: SharedMarketplace,
    /// Wallet side of the ledger's payouts, for balance lookups
    pub rail: InMemoryRail,
}

impl AppState {
    pub fn new(owner: Address, config: MarketplaceConfig) -> Result<Self, ConfigError> {
        let rail = InMemoryRail::new();
        let market = Marketplace::with_config(owner, config, Box::new(rail.clone()))?;
        Ok(Self {
            market: SharedMarketplace::new(market),
            rail,
        })
    }

    /// Run a ledger call on the blocking pool.
    ///
    /// The ledger lock is a blocking mutex and a settling rail may wait on
    /// an external wallet, so neither may hold an async worker.
    pub async fn ledger<R, F>(&self, op: F) -> Result<R, AppError>
    where
        F: FnOnce(&SharedMarketplace) -> Result<R, MarketError> + Send + 'static,
        R: Send + 'static,
    {
        let market = self.market.clone();
        let result = tokio::task::spawn_blocking(move || op(&market))
            .await
            .map_err(|e| anyhow::anyhow!("Ledger task join error: {e}"))?;
        Ok(result?)
    }

    /// Wall-clock time handed to ledger operations, Unix milliseconds.
    pub fn now(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
