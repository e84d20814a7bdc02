use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::types::{LpPosition, PortfolioTotals, PositionValuation, TokenMetrics};

/// Convert a raw base-unit amount into a UI amount (`raw / 10^decimals`).
///
/// Decimals beyond what `Decimal` can represent (28) are clamped.
pub fn to_ui_amount(raw: u64, decimals: u32) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(raw), decimals.min(28))
}

fn ui_f64(raw: u64, decimals: u32) -> f64 {
    to_ui_amount(raw, decimals).to_f64().unwrap_or(0.0)
}

/// Value a position at current prices.
///
/// A token with no metrics is priced at zero so a missing quote never hides
/// the rest of the position.
pub fn value_position(
    position: &LpPosition,
    metrics_x: Option<&TokenMetrics>,
    metrics_y: Option<&TokenMetrics>,
) -> PositionValuation {
    let price_x = metrics_x.map(|m| m.price_usd).unwrap_or(0.0);
    let price_y = metrics_y.map(|m| m.price_usd).unwrap_or(0.0);

    let amount_x = ui_f64(position.amount_x, position.token_x.decimals);
    let amount_y = ui_f64(position.amount_y, position.token_y.decimals);
    let value_x_usd = amount_x * price_x;
    let value_y_usd = amount_y * price_y;
    let liquidity_usd = value_x_usd + value_y_usd;

    let unclaimed_fee_x = ui_f64(position.unclaimed_fee_x, position.token_x.decimals);
    let unclaimed_fee_y = ui_f64(position.unclaimed_fee_y, position.token_y.decimals);
    let unclaimed_fees_usd = unclaimed_fee_x * price_x + unclaimed_fee_y * price_y;
    let total_fees_usd = unclaimed_fees_usd + position.claimed_fees_usd;

    let total_value_usd = liquidity_usd + total_fees_usd;
    let pnl_usd = total_value_usd - position.initial_deposit_usd;

    PositionValuation {
        amount_x,
        amount_y,
        value_x_usd,
        value_y_usd,
        liquidity_usd,
        unclaimed_fee_x,
        unclaimed_fee_y,
        unclaimed_fees_usd,
        claimed_fees_usd: position.claimed_fees_usd,
        total_fees_usd,
        total_value_usd,
        initial_deposit_usd: position.initial_deposit_usd,
        pnl_usd,
        pnl_percent: percent_of(pnl_usd, position.initial_deposit_usd),
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// Percent change of `current` against `initial`; `None` without a usable baseline.
pub fn volume_change_pct(initial: f64, current: f64) -> Option<f64> {
    if initial > 0.0 {
        Some((current - initial) / initial * 100.0)
    } else {
        None
    }
}

/// Sum valuations into portfolio totals.
pub fn aggregate(valuations: &[PositionValuation]) -> PortfolioTotals {
    let mut totals = PortfolioTotals {
        positions: valuations.len(),
        ..PortfolioTotals::default()
    };
    for v in valuations {
        totals.initial_deposit_usd += v.initial_deposit_usd;
        totals.liquidity_usd += v.liquidity_usd;
        totals.unclaimed_fees_usd += v.unclaimed_fees_usd;
        totals.claimed_fees_usd += v.claimed_fees_usd;
        totals.total_value_usd += v.total_value_usd;
        totals.pnl_usd += v.pnl_usd;
    }
    totals.pnl_percent = percent_of(totals.pnl_usd, totals.initial_deposit_usd);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenInfo;
    use rust_decimal_macros::dec;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn metrics(price: f64) -> TokenMetrics {
        TokenMetrics {
            price_usd: price,
            volume_24h_usd: 0.0,
            price_change_24h_pct: 0.0,
            liquidity_usd: 0.0,
            fetched_at: 0,
        }
    }

    fn sol_usdc_position() -> LpPosition {
        LpPosition {
            id: "pos1".to_string(),
            pool: "pool1".to_string(),
            token_x: TokenInfo {
                mint: "So11111111111111111111111111111111111111112".to_string(),
                symbol: "SOL".to_string(),
                decimals: 9,
            },
            token_y: TokenInfo {
                mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            amount_x: 2_500_000_000,     // 2.5 SOL
            amount_y: 300_000_000,       // 300 USDC
            unclaimed_fee_x: 10_000_000, // 0.01 SOL
            unclaimed_fee_y: 1_500_000,  // 1.5 USDC
            claimed_fees_usd: 4.0,
            initial_deposit_usd: 700.0,
        }
    }

    // ── to_ui_amount ───────────────────────────────────────────────

    #[test]
    fn ui_amount_exact() {
        assert_eq!(to_ui_amount(1_500_000, 6), dec!(1.5));
        assert_eq!(to_ui_amount(1, 9), dec!(0.000000001));
        assert_eq!(to_ui_amount(42, 0), dec!(42));
    }

    #[test]
    fn ui_amount_max_u64() {
        assert_eq!(to_ui_amount(u64::MAX, 0), Decimal::from(u64::MAX));
    }

    #[test]
    fn ui_amount_clamps_decimals() {
        assert_eq!(to_ui_amount(1, 40).scale(), 28);
    }

    // ── value_position ─────────────────────────────────────────────

    #[test]
    fn value_basic() {
        let pos = sol_usdc_position();
        let v = value_position(&pos, Some(&metrics(160.0)), Some(&metrics(1.0)));
        assert!(approx_eq(v.amount_x, 2.5));
        assert!(approx_eq(v.amount_y, 300.0));
        assert!(approx_eq(v.value_x_usd, 400.0));
        assert!(approx_eq(v.liquidity_usd, 700.0));
        assert!(approx_eq(v.unclaimed_fees_usd, 0.01 * 160.0 + 1.5));
        assert!(approx_eq(v.total_fees_usd, 3.1 + 4.0));
        assert!(approx_eq(v.total_value_usd, 707.1));
        assert!(approx_eq(v.pnl_usd, 7.1));
        assert!(approx_eq(v.pnl_percent, 7.1 / 700.0 * 100.0));
    }

    #[test]
    fn value_missing_price_is_zero() {
        let pos = sol_usdc_position();
        let v = value_position(&pos, None, Some(&metrics(1.0)));
        assert!(approx_eq(v.value_x_usd, 0.0));
        assert!(approx_eq(v.liquidity_usd, 300.0));
        assert!(v.pnl_usd < 0.0);
    }

    #[test]
    fn value_zero_deposit_has_zero_percent() {
        let mut pos = sol_usdc_position();
        pos.initial_deposit_usd = 0.0;
        let v = value_position(&pos, Some(&metrics(160.0)), Some(&metrics(1.0)));
        assert!(v.pnl_usd > 0.0);
        assert_eq!(v.pnl_percent, 0.0);
    }

    // ── volume_change_pct ──────────────────────────────────────────

    #[test]
    fn volume_change() {
        assert!(approx_eq(volume_change_pct(1000.0, 1500.0).unwrap(), 50.0));
        assert!(approx_eq(volume_change_pct(1000.0, 800.0).unwrap(), -20.0));
        assert_eq!(volume_change_pct(0.0, 800.0), None);
    }

    // ── aggregate ──────────────────────────────────────────────────

    #[test]
    fn aggregate_empty() {
        let t = aggregate(&[]);
        assert_eq!(t.positions, 0);
        assert_eq!(t.pnl_percent, 0.0);
    }

    #[test]
    fn aggregate_sums() {
        let pos = sol_usdc_position();
        let a = value_position(&pos, Some(&metrics(160.0)), Some(&metrics(1.0)));
        let b = value_position(&pos, Some(&metrics(120.0)), Some(&metrics(1.0)));
        let t = aggregate(&[a.clone(), b.clone()]);
        assert_eq!(t.positions, 2);
        assert!(approx_eq(t.initial_deposit_usd, 1400.0));
        assert!(approx_eq(t.total_value_usd, a.total_value_usd + b.total_value_usd));
        assert!(approx_eq(t.claimed_fees_usd, 8.0));
        assert!(approx_eq(t.pnl_usd, a.pnl_usd + b.pnl_usd));
        assert!(approx_eq(t.pnl_percent, t.pnl_usd / 1400.0 * 100.0));
    }
}
