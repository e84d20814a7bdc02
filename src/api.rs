use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::rsi::compute_rsi;
use crate::types::{Candle, RsiReading, TokenMetrics, normalize_candles};
use crate::{DEXSCREENER_API_BASE, GECKO_API_BASE, USER_AGENT};

/// Build the shared HTTP client.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

// ── GeckoTerminal OHLCV ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OhlcvResponse {
    data: OhlcvData,
}

#[derive(Debug, Deserialize)]
struct OhlcvData {
    attributes: OhlcvAttributes,
}

#[derive(Debug, Deserialize)]
struct OhlcvAttributes {
    #[serde(default)]
    ohlcv_list: Vec<Vec<serde_json::Value>>,
}

/// Parse an OHLCV response body into ascending candles.
///
/// Malformed rows are skipped.
pub fn parse_ohlcv(body: serde_json::Value) -> Result<Vec<Candle>> {
    let resp: OhlcvResponse =
        serde_json::from_value(body).context("unexpected OHLCV response shape")?;
    let rows = resp.data.attributes.ohlcv_list;
    let total = rows.len();
    let candles: Vec<Candle> = rows.iter().filter_map(|r| Candle::from_row(r)).collect();
    if candles.len() < total {
        debug!("Dropped {} malformed OHLCV row(s)", total - candles.len());
    }
    Ok(normalize_candles(candles))
}

/// Fetch OHLCV candles for a pool, oldest first.
pub async fn fetch_ohlcv(
    client: &reqwest::Client,
    network: &str,
    pool: &str,
    timeframe: &str,
    aggregate: u32,
    limit: u32,
) -> Result<Vec<Candle>> {
    let url = format!("{GECKO_API_BASE}/networks/{network}/pools/{pool}/ohlcv/{timeframe}");
    let body: serde_json::Value = client
        .get(&url)
        .query(&[
            ("aggregate", aggregate.to_string()),
            ("limit", limit.to_string()),
        ])
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("OHLCV request failed for pool {pool}"))?
        .error_for_status()
        .with_context(|| format!("OHLCV request rejected for pool {pool}"))?
        .json()
        .await
        .context("failed to decode OHLCV response")?;
    let candles = parse_ohlcv(body)?;
    debug!("Fetched {} candles for pool {pool}", candles.len());
    Ok(candles)
}

/// Fetch candles and compute the pool's RSI.
///
/// Fetch and parse failures are logged and reported as `NoData` so one bad
/// pool never interrupts a cycle.
pub async fn fetch_pool_rsi(
    client: &reqwest::Client,
    network: &str,
    pool: &str,
    timeframe: &str,
    aggregate: u32,
    limit: u32,
) -> RsiReading {
    match fetch_ohlcv(client, network, pool, timeframe, aggregate, limit).await {
        Ok(candles) => compute_rsi(&candles),
        Err(e) => {
            warn!("RSI unavailable for pool {pool}: {e:#}");
            RsiReading::NoData
        }
    }
}

// ── DexScreener ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    chain_id: String,
    pair_address: String,
    base_token: DexToken,
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    volume: Option<Window24h>,
    #[serde(default)]
    price_change: Option<Window24h>,
    #[serde(default)]
    liquidity: Option<DexLiquidity>,
}

#[derive(Debug, Clone, Deserialize)]
struct DexToken {
    address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Window24h {
    #[serde(default)]
    h24: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct DexLiquidity {
    #[serde(default)]
    usd: Option<f64>,
}

impl DexPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    fn volume_24h(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }
}

fn parse_pairs(body: serde_json::Value) -> Result<Vec<DexPair>> {
    let resp: PairsResponse =
        serde_json::from_value(body).context("unexpected DexScreener response shape")?;
    Ok(resp.pairs.unwrap_or_default())
}

/// Pick metrics for `mint` from a token search response.
///
/// Only pairs on `chain` where the token is the base token are considered
/// (`priceUsd` quotes the base token); the most liquid one wins.
pub fn select_token_metrics(
    body: serde_json::Value,
    chain: &str,
    mint: &str,
    fetched_at: i64,
) -> Result<Option<TokenMetrics>> {
    let best = parse_pairs(body)?
        .into_iter()
        .filter(|p| p.chain_id == chain && p.base_token.address == mint)
        .filter_map(|p| {
            let price = p.price_usd.as_deref()?.parse::<f64>().ok()?;
            Some((p, price))
        })
        .max_by(|(a, _), (b, _)| a.liquidity_usd().total_cmp(&b.liquidity_usd()));

    Ok(best.map(|(pair, price_usd)| TokenMetrics {
        price_usd,
        volume_24h_usd: pair.volume_24h(),
        price_change_24h_pct: pair.price_change.as_ref().and_then(|c| c.h24).unwrap_or(0.0),
        liquidity_usd: pair.liquidity_usd(),
        fetched_at,
    }))
}

/// Pick the 24h volume of `pool` from a pair lookup response.
pub fn select_pool_volume(body: serde_json::Value, pool: &str) -> Result<Option<f64>> {
    Ok(parse_pairs(body)?
        .into_iter()
        .find(|p| p.pair_address == pool)
        .map(|p| p.volume_24h()))
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("request rejected: {url}"))?
        .json()
        .await
        .with_context(|| format!("failed to decode response from {url}"))
}

/// Fetch price, volume and liquidity for a token mint.
pub async fn fetch_token_metrics(
    client: &reqwest::Client,
    chain: &str,
    mint: &str,
) -> Result<Option<TokenMetrics>> {
    let url = format!("{DEXSCREENER_API_BASE}/latest/dex/tokens/{mint}");
    let body = get_json(client, &url).await?;
    let metrics = select_token_metrics(body, chain, mint, chrono::Utc::now().timestamp())?;
    if metrics.is_none() {
        debug!("No {chain} pair found for token {mint}");
    }
    Ok(metrics)
}

/// Fetch the 24h USD volume of a pool.
pub async fn fetch_pool_volume(
    client: &reqwest::Client,
    chain: &str,
    pool: &str,
) -> Result<Option<f64>> {
    let url = format!("{DEXSCREENER_API_BASE}/latest/dex/pairs/{chain}/{pool}");
    let body = get_json(client, &url).await?;
    select_pool_volume(body, pool)
}
