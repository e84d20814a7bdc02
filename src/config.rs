use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::LpPosition;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable that overrides `wallet.address`.
pub const WALLET_VAR: &str = "LP_MONITOR_WALLET";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub wallet: WalletConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub positions: Vec<LpPosition>,
}

/// Wallet whose positions are being monitored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub address: String,
}

/// Market-data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// GeckoTerminal network id.
    #[serde(default = "default_network")]
    pub network: String,
    /// DexScreener chain id.
    #[serde(default = "default_chain")]
    pub chain: String,
    /// OHLCV timeframe: `day`, `hour` or `minute`.
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Number of timeframe units per candle.
    #[serde(default = "default_aggregate")]
    pub aggregate: u32,
    /// Number of candles requested for RSI.
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u32,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_network() -> String {
    "solana".to_string()
}

fn default_chain() -> String {
    "solana".to_string()
}

fn default_timeframe() -> String {
    "hour".to_string()
}

fn default_aggregate() -> u32 {
    1
}

fn default_candle_limit() -> u32 {
    100
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            chain: default_chain(),
            timeframe: default_timeframe(),
            aggregate: default_aggregate(),
            candle_limit: default_candle_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate config from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.settings.timeframe.as_str(), "day" | "hour" | "minute") {
            anyhow::bail!(
                "settings.timeframe must be day, hour or minute (got {:?})",
                self.settings.timeframe
            );
        }
        if self.settings.candle_limit == 0 {
            anyhow::bail!("settings.candle_limit must be positive");
        }
        if self.settings.aggregate == 0 {
            anyhow::bail!("settings.aggregate must be positive");
        }
        for pos in &self.positions {
            if pos.pool.is_empty() {
                anyhow::bail!("position {:?} has an empty pool address", pos.id);
            }
        }
        Ok(())
    }

    /// Apply the wallet override from the environment, if set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        self.apply_wallet_override(std::env::var(WALLET_VAR).ok());
    }

    fn apply_wallet_override(&mut self, wallet: Option<String>) {
        if let Some(addr) = wallet.filter(|a| !a.trim().is_empty()) {
            self.wallet.address = addr.trim().to_string();
        }
    }
}
