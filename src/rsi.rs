//! Wilder's smoothed Relative Strength Index.
//!
//! Computes a single RSI value over a chronologically ordered close series.
//! The engine never fails: short or malformed series yield
//! [`RsiReading::NoData`], which callers may collapse into the neutral
//! sentinel with [`RsiReading::or_sentinel`].

use crate::types::{Candle, RsiReading, RsiResult};

/// Fixed smoothing window.
pub const RSI_PERIOD: usize = 14;

/// Running Wilder averages of gains and losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilderAverages {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl WilderAverages {
    /// Seed from the first `min(RSI_PERIOD, diffs.len())` price changes.
    ///
    /// The divisor is always `RSI_PERIOD`, even when fewer changes are
    /// available, so short series get under-weighted averages.
    pub fn seed(diffs: &[f64]) -> Self {
        let window = &diffs[..diffs.len().min(RSI_PERIOD)];
        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for &d in window {
            if d > 0.0 {
                gain_sum += d;
            } else {
                loss_sum += -d;
            }
        }
        Self {
            avg_gain: gain_sum / RSI_PERIOD as f64,
            avg_loss: loss_sum / RSI_PERIOD as f64,
        }
    }

    /// Fold one more price change into the averages.
    pub fn smooth(&mut self, diff: f64) {
        let period = RSI_PERIOD as f64;
        let gain = diff.max(0.0);
        let loss = (-diff).max(0.0);
        self.avg_gain = (self.avg_gain * (period - 1.0) + gain) / period;
        self.avg_loss = (self.avg_loss * (period - 1.0) + loss) / period;
    }

    /// RSI implied by the current averages. Zero average loss maps to 100,
    /// which also covers a perfectly flat series.
    pub fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            return 100.0;
        }
        let rs = self.avg_gain / self.avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Consecutive close-to-close changes.
pub fn price_changes(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] - w[0]).collect()
}

/// RSI over a close series ordered oldest to newest.
///
/// Returns 0.0 when there are fewer than two closes.
pub fn wilder_rsi(closes: &[f64]) -> f64 {
    let diffs = price_changes(closes);
    if diffs.is_empty() {
        return 0.0;
    }
    let mut averages = WilderAverages::seed(&diffs);
    for &d in diffs.iter().skip(RSI_PERIOD) {
        averages.smooth(d);
    }
    averages.rsi()
}

/// RSI over a candle series ordered oldest to newest, stamped with the
/// newest candle's timestamp.
///
/// Fewer than two candles, or closes that produce a non-finite value,
/// yield `NoData`.
pub fn compute_rsi(candles: &[Candle]) -> RsiReading {
    let Some(newest) = candles.last() else {
        return RsiReading::NoData;
    };
    if candles.len() < 2 {
        return RsiReading::NoData;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let value = wilder_rsi(&closes);
    if !value.is_finite() {
        return RsiReading::NoData;
    }
    RsiReading::Computed(RsiResult {
        value: value.clamp(0.0, 100.0),
        timestamp: newest.timestamp,
    })
}

impl RsiReading {
    /// Collapse into a plain result; `NoData` becomes `{ value: 0, timestamp: now }`.
    pub fn or_sentinel(self, now: i64) -> RsiResult {
        match self {
            RsiReading::Computed(result) => result,
            RsiReading::NoData => RsiResult {
                value: 0.0,
                timestamp: now,
            },
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            RsiReading::Computed(result) => Some(result.value),
            RsiReading::NoData => None,
        }
    }
}
