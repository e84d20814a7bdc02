pub mod api;
pub mod config;
pub mod monitor;
pub mod reporter;
pub mod rsi;
pub mod state;
pub mod types;
pub mod valuation;

/// GeckoTerminal public API base URL (OHLCV, no auth required)
pub const GECKO_API_BASE: &str = "https://api.geckoterminal.com/api/v2";

/// DexScreener public API base URL (token and pair metrics)
pub const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com";

/// User agent sent with every market-data request
pub const USER_AGENT: &str = concat!("lp-monitor/", env!("CARGO_PKG_VERSION"));
