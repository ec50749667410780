//! Drift: how far current value-weights sit from normalized targets.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use super::Portfolio;
use crate::error::{RebalanceError, Result};
use crate::types::Symbol;

/// One symbol's current weight against its target weight.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftEntry {
    pub symbol: Symbol,
    /// Share of total value currently held (zero when total value is zero)
    pub current_weight: Decimal,
    /// Normalized target weight (zero for untargeted holdings)
    pub target_weight: Decimal,
}

impl DriftEntry {
    /// `current_weight - target_weight`; positive means overweight.
    #[inline]
    pub fn difference(&self) -> Decimal {
        self.current_weight - self.target_weight
    }
}

impl Portfolio {
    /// Per-symbol comparison of current weights against normalized targets.
    ///
    /// Covers targeted symbols first, in target order, followed by holdings
    /// that have no target, in holding order.
    pub fn drift(&self) -> Result<Vec<DriftEntry>> {
        let targets = self.normalized_weights()?;
        let current: FxHashMap<Symbol, Decimal> =
            self.security_percentages()?.into_iter().collect();
        let weight_of = |sym: &Symbol| current.get(sym).copied().unwrap_or(Decimal::ZERO);

        let mut entries: Vec<DriftEntry> = targets
            .into_iter()
            .map(|(symbol, target_weight)| DriftEntry {
                current_weight: weight_of(&symbol),
                target_weight,
                symbol,
            })
            .collect();

        for (symbol, _) in &self.current_state {
            if self.desired_state.iter().any(|(s, _)| s == symbol) {
                continue;
            }
            entries.push(DriftEntry {
                symbol: symbol.clone(),
                current_weight: weight_of(symbol),
                target_weight: Decimal::ZERO,
            });
        }

        // Targets still need prices even when nothing is held.
        for entry in &entries {
            if self.security(entry.symbol.as_str()).is_none() {
                return Err(RebalanceError::UnknownSecurity {
                    symbol: entry.symbol.clone(),
                });
            }
        }

        Ok(entries)
    }
}
