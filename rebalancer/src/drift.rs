//! Drift report: current value-weights against normalized targets.

use rebalance::{Decimal, DriftEntry, Portfolio, RebalanceError, Symbol};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::error::Result;

/// Per-symbol drift plus an overall tracking error.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
    /// `entries` in percent, rounded for display
    pub rows: Vec<DriftRow>,
    /// Root-mean-square weight difference, in percent
    pub tracking_error_pct: f64,
}

/// One drift entry as percentages.
#[derive(Debug, Clone, Serialize)]
pub struct DriftRow {
    pub symbol: Symbol,
    pub target_pct: Decimal,
    pub current_pct: Decimal,
    pub diff_pct: Decimal,
}

/// `weight` as a percentage rounded to two places.
///
/// Short holdings can push a weight close to the decimal limit, so the
/// scaling is checked.
pub fn percent(weight: Decimal) -> Result<Decimal> {
    weight
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(2))
        .ok_or_else(|| {
            RebalanceError::ArithmeticOverflow {
                context: "percentage",
            }
            .into()
        })
}

/// Compare current weights against targets.
pub fn drift_report(portfolio: &Portfolio) -> Result<DriftReport> {
    let entries = portfolio.drift()?;

    let sum_sq: f64 = entries
        .iter()
        .map(|e| {
            let d = e.difference().to_f64().unwrap_or(0.0);
            d * d
        })
        .sum();
    let tracking_error_pct = (sum_sq / entries.len().max(1) as f64).sqrt() * 100.0;

    let rows = entries
        .iter()
        .map(|e| {
            let diff = e
                .current_weight
                .checked_sub(e.target_weight)
                .ok_or(RebalanceError::ArithmeticOverflow {
                    context: "weight difference",
                })?;
            Ok(DriftRow {
                symbol: e.symbol.clone(),
                target_pct: percent(e.target_weight)?,
                current_pct: percent(e.current_weight)?,
                diff_pct: percent(diff)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DriftReport {
        entries,
        rows,
        tracking_error_pct,
    })
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DRIFT:")?;
        writeln!(
            f,
            "  {:8} {:>10} {:>10} {:>10}",
            "Symbol", "Target%", "Current%", "Diff%"
        )?;
        for row in &self.rows {
            let sign = if row.diff_pct > Decimal::ZERO { "+" } else { "" };
            writeln!(
                f,
                "  {:8} {:>9}% {:>9}% {:>9}%",
                row.symbol,
                row.target_pct.to_string(),
                row.current_pct.to_string(),
                format!("{sign}{}", row.diff_pct),
            )?;
        }
        writeln!(f, "\n  Tracking error: {:.3}%", self.tracking_error_pct)?;
        Ok(())
    }
}
