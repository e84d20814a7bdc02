use serde::{Deserialize, Serialize};

/// One OHLCV sample. `timestamp` keeps the units of the source API
/// (GeckoTerminal reports unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Parse a `[timestamp, open, high, low, close, volume]` row.
    ///
    /// Returns `None` for rows that are too short or hold non-numeric values.
    pub fn from_row(row: &[serde_json::Value]) -> Option<Self> {
        if row.len() < 6 {
            return None;
        }
        let num = |v: &serde_json::Value| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.parse::<f64>().ok()))
        };
        Some(Self {
            timestamp: row[0].as_i64().or_else(|| {
                num(&row[0])
                    .filter(|t| t.is_finite())
                    .map(|t| t as i64)
            })?,
            open: num(&row[1])?,
            high: num(&row[2])?,
            low: num(&row[3])?,
            close: num(&row[4])?,
            volume: num(&row[5])?,
        })
    }
}

/// Sort candles chronologically ascending (oldest first).
///
/// The OHLCV endpoint returns newest-first; everything downstream expects the
/// newest sample last.
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp);
    candles
}

/// SPL token identity needed for unit conversion and price lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub mint: String,
    pub symbol: String,
    pub decimals: u32,
}

/// A liquidity-pool position as declared in `config.toml`.
///
/// Amounts are raw integer base units, as read from the position account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpPosition {
    /// Position account address or any unique label.
    pub id: String,
    /// Pool (pair) address; used for OHLCV and pool volume lookups.
    pub pool: String,
    pub token_x: TokenInfo,
    pub token_y: TokenInfo,
    #[serde(default)]
    pub amount_x: u64,
    #[serde(default)]
    pub amount_y: u64,
    #[serde(default)]
    pub unclaimed_fee_x: u64,
    #[serde(default)]
    pub unclaimed_fee_y: u64,
    /// Fees already claimed, in USD at claim time.
    #[serde(default)]
    pub claimed_fees_usd: f64,
    /// USD value deposited when the position was opened.
    #[serde(default)]
    pub initial_deposit_usd: f64,
}

/// Market metrics for one token, from the most liquid pair on the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub price_usd: f64,
    pub volume_24h_usd: f64,
    pub price_change_24h_pct: f64,
    pub liquidity_usd: f64,
    /// Unix seconds when the metrics were fetched.
    pub fetched_at: i64,
}

/// USD valuation of one position at current prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub amount_x: f64,
    pub amount_y: f64,
    pub value_x_usd: f64,
    pub value_y_usd: f64,
    pub liquidity_usd: f64,
    pub unclaimed_fee_x: f64,
    pub unclaimed_fee_y: f64,
    pub unclaimed_fees_usd: f64,
    pub claimed_fees_usd: f64,
    pub total_fees_usd: f64,
    pub total_value_usd: f64,
    pub initial_deposit_usd: f64,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
}

/// Result of an RSI computation: the value and the timestamp of the newest
/// candle it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    pub value: f64,
    pub timestamp: i64,
}

/// RSI outcome that keeps "no data" distinguishable from a real reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RsiReading {
    Computed(RsiResult),
    NoData,
}

/// Per-position section of a cycle report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub id: String,
    pub pool: String,
    pub pair: String,
    pub price_x_usd: Option<f64>,
    pub price_y_usd: Option<f64>,
    pub price_change_24h_x_pct: Option<f64>,
    pub valuation: PositionValuation,
    pub pool_volume_24h_usd: Option<f64>,
    pub baseline_volume_usd: Option<f64>,
    pub volume_change_pct: Option<f64>,
    pub rsi: RsiReading,
    /// `rsi` collapsed to a number; no data reads as 0 at the cycle time.
    pub rsi_value: RsiResult,
}

/// Portfolio-level sums across all positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub positions: usize,
    pub initial_deposit_usd: f64,
    pub liquidity_usd: f64,
    pub unclaimed_fees_usd: f64,
    pub claimed_fees_usd: f64,
    pub total_value_usd: f64,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
}

/// Everything one monitoring cycle produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub timestamp: String,
    pub wallet: String,
    pub cycle: u64,
    pub positions: Vec<PositionReport>,
    pub totals: PortfolioTotals,
}
