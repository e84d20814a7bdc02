use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::TokenMetrics;

/// Default state file path.
pub const STATE_PATH: &str = "lp_state.json";

/// Cross-cycle memory of the monitor.
///
/// Owned by the caller and threaded through each cycle by `&mut`, then saved
/// so the volume baselines survive between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorState {
    /// First observed 24h volume per pool address.
    #[serde(default)]
    pub initial_volume: HashMap<String, f64>,
    /// Last successfully fetched metrics per token mint.
    #[serde(default)]
    pub token_metrics: HashMap<String, TokenMetrics>,
    #[serde(default)]
    pub cycles: u64,
    /// Unix seconds of the last completed cycle.
    #[serde(default)]
    pub last_run: Option<i64>,
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state from a JSON file. A missing file yields a fresh state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No state file at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let state: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(state)
    }

    /// Write state to a JSON file.
    ///
    /// Writes a sibling `.tmp` file and renames it over `path`, so an
    /// interrupted write never leaves a truncated state file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        let tmp = tmp_path(path);
        std::fs::write(&tmp, contents)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Record the pool's current volume and return its baseline.
    ///
    /// The first observation becomes the baseline; later calls leave it
    /// untouched. A zero baseline is replaced by the next non-zero volume.
    pub fn record_volume(&mut self, pool: &str, current: f64) -> f64 {
        let baseline = self.initial_volume.entry(pool.to_string()).or_insert(current);
        if *baseline <= 0.0 && current > 0.0 {
            *baseline = current;
        }
        *baseline
    }

    /// Pick the metrics to use for a token this cycle.
    ///
    /// Fresh metrics replace the cached entry; without them the last known
    /// metrics are returned, if any.
    pub fn resolve_metrics(
        &mut self,
        mint: &str,
        fresh: Option<TokenMetrics>,
    ) -> Option<TokenMetrics> {
        match fresh {
            Some(metrics) => {
                self.token_metrics.insert(mint.to_string(), metrics.clone());
                Some(metrics)
            }
            None => self.token_metrics.get(mint).cloned(),
        }
    }

    /// Mark a cycle as complete and return its number.
    pub fn finish_cycle(&mut self, now: i64) -> u64 {
        self.cycles += 1;
        self.last_run = Some(now);
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(price: f64, fetched_at: i64) -> TokenMetrics {
        TokenMetrics {
            price_usd: price,
            volume_24h_usd: 1000.0,
            price_change_24h_pct: 1.5,
            liquidity_usd: 50_000.0,
            fetched_at,
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lp_monitor_{name}_{}.json", std::process::id()))
    }

    #[test]
    fn volume_baseline_recorded_once() {
        let mut state = MonitorState::new();
        assert_eq!(state.record_volume("pool1", 1000.0), 1000.0);
        assert_eq!(state.record_volume("pool1", 2500.0), 1000.0);
        assert_eq!(state.record_volume("pool2", 10.0), 10.0);
        assert_eq!(state.initial_volume.len(), 2);
    }

    #[test]
    fn volume_zero_baseline_replaced() {
        let mut state = MonitorState::new();
        assert_eq!(state.record_volume("pool1", 0.0), 0.0);
        assert_eq!(state.record_volume("pool1", 300.0), 300.0);
        assert_eq!(state.record_volume("pool1", 900.0), 300.0);
    }

    #[test]
    fn metrics_fresh_replaces_cache() {
        let mut state = MonitorState::new();
        state.resolve_metrics("mint", Some(metrics(1.0, 10)));
        let got = state.resolve_metrics("mint", Some(metrics(2.0, 20))).unwrap();
        assert_eq!(got.price_usd, 2.0);
        assert_eq!(state.token_metrics["mint"].fetched_at, 20);
    }

    #[test]
    fn metrics_fallback_to_cache() {
        let mut state = MonitorState::new();
        state.resolve_metrics("mint", Some(metrics(1.0, 10)));
        let got = state.resolve_metrics("mint", None).unwrap();
        assert_eq!(got.price_usd, 1.0);
        assert_eq!(got.fetched_at, 10);
    }

    #[test]
    fn metrics_unknown_without_fresh() {
        let mut state = MonitorState::new();
        assert!(state.resolve_metrics("mint", None).is_none());
    }

    #[test]
    fn finish_cycle_counts() {
        let mut state = MonitorState::new();
        assert_eq!(state.finish_cycle(100), 1);
        assert_eq!(state.finish_cycle(200), 2);
        assert_eq!(state.last_run, Some(200));
    }

    #[test]
    fn load_missing_file_is_fresh() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        let state = MonitorState::load(&path).unwrap();
        assert_eq!(state.cycles, 0);
        assert!(state.initial_volume.is_empty());
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip");
        let mut state = MonitorState::new();
        state.record_volume("pool1", 1234.0);
        state.resolve_metrics("mint", Some(metrics(3.0, 30)));
        state.finish_cycle(300);
        state.save(&path).unwrap();

        let loaded = MonitorState::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.initial_volume["pool1"], 1234.0);
        assert_eq!(loaded.token_metrics["mint"], metrics(3.0, 30));
        assert_eq!(loaded.cycles, 1);
        assert_eq!(loaded.last_run, Some(300));
    }

    #[test]
    fn save_replaces_existing_and_leaves_no_tmp() {
        let path = temp_path("replace");
        std::fs::write(&path, "{ truncated").unwrap();

        let mut state = MonitorState::new();
        state.record_volume("pool1", 42.0);
        state.save(&path).unwrap();

        let loaded = MonitorState::load(&path);
        let tmp_exists = tmp_path(&path).exists();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.unwrap().initial_volume["pool1"], 42.0);
        assert!(!tmp_exists);
    }

    #[test]
    fn tmp_path_is_sibling() {
        let tmp = tmp_path(Path::new("/var/lib/lp/lp_state.json"));
        assert_eq!(tmp, PathBuf::from("/var/lib/lp/lp_state.json.tmp"));
    }

    #[test]
    fn load_corrupt_file_errors() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();
        let result = MonitorState::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
