use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use lp_monitor::api::http_client;
use lp_monitor::config::{AppConfig, CONFIG_PATH};
use lp_monitor::monitor::run_cycle;
use lp_monitor::reporter;
use lp_monitor::state::{MonitorState, STATE_PATH};

#[derive(Parser)]
#[command(name = "lp_monitor", about = "Liquidity-pool position monitor")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Path to the JSON state file carried between runs
    #[arg(long, default_value = STATE_PATH)]
    state: PathBuf,

    /// Wallet address (overrides config and LP_MONITOR_WALLET)
    #[arg(long)]
    wallet: Option<String>,

    /// Pretty-print the report instead of a single JSON line
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    config.apply_env_overrides();
    if let Some(wallet) = args.wallet {
        config.wallet.address = wallet;
    }
    if config.wallet.address.trim().is_empty() {
        anyhow::bail!("wallet address is empty");
    }
    info!("Loaded config from {}", args.config.display());

    if config.positions.is_empty() {
        warn!("No positions configured, report will be empty");
    }

    let mut state = MonitorState::load(&args.state)?;
    info!(
        "Loaded state ({} previous cycle(s), {} pool baseline(s))",
        state.cycles,
        state.initial_volume.len()
    );

    let client = http_client(config.settings.request_timeout_secs)?;
    let report = run_cycle(&client, &config, &mut state).await?;

    if args.pretty {
        reporter::report_cycle_pretty(&report);
    } else {
        reporter::report_cycle(&report);
    }

    state.save(&args.state)?;
    info!(
        "Cycle {} complete: total=${:.2} pnl=${:.2} ({:.2}%)",
        report.cycle, report.totals.total_value_usd, report.totals.pnl_usd, report.totals.pnl_percent,
    );

    Ok(())
}
