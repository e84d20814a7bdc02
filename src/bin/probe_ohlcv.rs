//! Probe: GeckoTerminal OHLCV endpoint
//!
//! Hits GET /networks/<network>/pools/<pool>/ohlcv/<timeframe> and documents:
//! - Response shape and row layout
//! - Row ordering as returned (newest-first)
//! - RSI over the normalized series

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use lp_monitor::GECKO_API_BASE;
use lp_monitor::api::parse_ohlcv;
use lp_monitor::rsi::compute_rsi;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "probe_ohlcv", about = "Dump OHLCV data and RSI for a pool")]
struct Args {
    #[arg(long, default_value = "solana")]
    network: String,

    #[arg(long)]
    pool: String,

    #[arg(long, default_value = "hour")]
    timeframe: String,

    #[arg(long, default_value_t = 1)]
    aggregate: u32,

    #[arg(long, default_value_t = 100)]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();
    let url = format!(
        "{}/networks/{}/pools/{}/ohlcv/{}",
        GECKO_API_BASE, args.network, args.pool, args.timeframe
    );

    println!("=== Probe: OHLCV ===");
    println!("Pool: {}", args.pool);
    println!();

    println!("--- 1. Fetch ---");
    let start = Instant::now();
    let resp = client
        .get(&url)
        .query(&[
            ("aggregate", args.aggregate.to_string()),
            ("limit", args.limit.to_string()),
        ])
        .send()
        .await?;
    let latency = start.elapsed();
    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("Status: {}", status);
    println!("Latency: {:?}", latency);
    println!();

    println!("--- 2. Raw rows ---");
    let rows = body
        .pointer("/data/attributes/ohlcv_list")
        .and_then(|v| v.as_array());
    match rows {
        Some(arr) => {
            println!("Row count: {}", arr.len());
            for row in arr.iter().take(3) {
                println!("  {}", row);
            }
            if let (Some(first), Some(last)) = (arr.first(), arr.last()) {
                let first_ts = first.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
                let last_ts = last.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
                let order = if first_ts > last_ts {
                    "newest-first"
                } else {
                    "oldest-first"
                };
                println!("Ordering: {order} ({first_ts} .. {last_ts})");
            }
        }
        None => {
            println!("No ohlcv_list in response:");
            println!("{}", serde_json::to_string_pretty(&body)?);
            return Ok(());
        }
    }
    println!();

    println!("--- 3. RSI ---");
    let candles = parse_ohlcv(body)?;
    println!("Parsed candles: {}", candles.len());
    println!("{}", serde_json::to_string_pretty(&compute_rsi(&candles))?);
    println!();

    println!("=== Probe Complete ===");
    Ok(())
}
