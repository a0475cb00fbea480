use anyhow::Context;
use contracts::config::MarketplaceConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use types::ids::Address;

const CONFIG_DIR_ENV: &str = "BOOKMARKET_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKMARKET";

/// Gateway configuration, layered from `.env`, `config/gateway.toml` and
/// `BOOKMARKET_*` variables (nested keys use `__`, e.g.
/// `BOOKMARKET_SERVER__PORT`).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    /// Platform owner address, `0x` + 40 hex digits
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        // A missing `.env` is fine.
        let _ = dotenvy::dotenv();

        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let cfg = config::Config::builder()
            .add_source(config::File::from(config_dir.join("gateway.toml")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to build configuration")?;

        let settings: Settings = cfg
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        settings
            .marketplace
            .validate()
            .context("invalid marketplace configuration")?;
        Ok(settings)
    }

    pub fn owner_address(&self) -> anyhow::Result<Address> {
        let raw = self
            .owner
            .as_deref()
            .context("owner address is not configured (set BOOKMARKET_OWNER)")?;
        Address::parse(raw).with_context(|| format!("invalid owner address '{raw}'"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}
