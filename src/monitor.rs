use anyhow::Result;
use tracing::{info, warn};

use crate::api::{fetch_pool_rsi, fetch_pool_volume, fetch_token_metrics};
use crate::config::AppConfig;
use crate::state::MonitorState;
use crate::types::{CycleReport, LpPosition, PositionReport, RsiReading, TokenMetrics};
use crate::valuation::{aggregate, value_position, volume_change_pct};

/// Assemble one position's report from already fetched data.
///
/// Records the pool volume baseline in `state` when a volume is known.
/// `now` (unix seconds) stamps the RSI sentinel when there is no data.
pub fn build_position_report(
    position: &LpPosition,
    metrics_x: Option<&TokenMetrics>,
    metrics_y: Option<&TokenMetrics>,
    pool_volume: Option<f64>,
    rsi: RsiReading,
    now: i64,
    state: &mut MonitorState,
) -> PositionReport {
    let valuation = value_position(position, metrics_x, metrics_y);

    let baseline = pool_volume.map(|v| state.record_volume(&position.pool, v));
    let volume_change = match (baseline, pool_volume) {
        (Some(initial), Some(current)) => volume_change_pct(initial, current),
        _ => None,
    };

    PositionReport {
        id: position.id.clone(),
        pool: position.pool.clone(),
        pair: format!("{}/{}", position.token_x.symbol, position.token_y.symbol),
        price_x_usd: metrics_x.map(|m| m.price_usd),
        price_y_usd: metrics_y.map(|m| m.price_usd),
        price_change_24h_x_pct: metrics_x.map(|m| m.price_change_24h_pct),
        valuation,
        pool_volume_24h_usd: pool_volume,
        baseline_volume_usd: baseline,
        volume_change_pct: volume_change,
        rsi,
        rsi_value: rsi.or_sentinel(now),
    }
}

async fn token_metrics_or_warn(
    client: &reqwest::Client,
    chain: &str,
    mint: &str,
) -> Option<TokenMetrics> {
    match fetch_token_metrics(client, chain, mint).await {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to fetch metrics for {mint}: {e:#}");
            None
        }
    }
}

/// Run one monitoring cycle over every configured position.
///
/// Fetch failures are absorbed per position: metrics fall back to the last
/// known values in `state`, RSI to `NoData`, volume to none.
pub async fn run_cycle(
    client: &reqwest::Client,
    config: &AppConfig,
    state: &mut MonitorState,
) -> Result<CycleReport> {
    let settings = &config.settings;
    info!(
        "Monitoring {} position(s) for wallet {}",
        config.positions.len(),
        config.wallet.address
    );

    let now = chrono::Utc::now();
    let mut reports = Vec::with_capacity(config.positions.len());
    for position in &config.positions {
        let (fresh_x, fresh_y, volume, rsi) = tokio::join!(
            token_metrics_or_warn(client, &settings.chain, &position.token_x.mint),
            token_metrics_or_warn(client, &settings.chain, &position.token_y.mint),
            fetch_pool_volume(client, &settings.chain, &position.pool),
            fetch_pool_rsi(
                client,
                &settings.network,
                &position.pool,
                &settings.timeframe,
                settings.aggregate,
                settings.candle_limit,
            ),
        );

        let metrics_x = state.resolve_metrics(&position.token_x.mint, fresh_x);
        let metrics_y = state.resolve_metrics(&position.token_y.mint, fresh_y);
        let volume = match volume {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to fetch volume for pool {}: {e:#}", position.pool);
                None
            }
        };

        let report = build_position_report(
            position,
            metrics_x.as_ref(),
            metrics_y.as_ref(),
            volume,
            rsi,
            now.timestamp(),
            state,
        );
        info!(
            "[{}] {} value=${:.2} pnl=${:.2} ({:.2}%) rsi={}",
            report.id,
            report.pair,
            report.valuation.total_value_usd,
            report.valuation.pnl_usd,
            report.valuation.pnl_percent,
            report
                .rsi
                .value()
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string()),
        );
        reports.push(report);
    }

    let valuations: Vec<_> = reports.iter().map(|r| r.valuation.clone()).collect();
    let totals = aggregate(&valuations);
    let cycle = state.finish_cycle(now.timestamp());

    Ok(CycleReport {
        timestamp: now.to_rfc3339(),
        wallet: config.wallet.address.clone(),
        cycle,
        positions: reports,
        totals,
    })
}
