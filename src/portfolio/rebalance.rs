//! Target-weight rebalancing: snapshot in, ordered trade list out.

use log::{debug, trace};
use rust_decimal::Decimal;

use super::Portfolio;
use crate::error::{RebalanceError, Result};
use crate::{Action, Order};

/// Decimal places a quantity change is rounded to before the materiality test.
///
/// Normalizing weights like 1/3 leaves residues in the last representable
/// digits; rounding here keeps those from turning into micro-orders.
pub const MATERIALITY_DP: u32 = 12;

/// Largest scale a decimal can carry.
const MAX_SCALE: u32 = 28;

/// Tuning for [`Portfolio::rebalance_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalanceOptions {
    /// Decimal places for the materiality rounding (and emitted quantities).
    pub materiality_dp: u32,
}

impl Default for RebalanceOptions {
    fn default() -> Self {
        Self {
            materiality_dp: MATERIALITY_DP,
        }
    }
}

impl RebalanceOptions {
    /// Builder: set the materiality scale, capped at the decimal maximum of 28.
    pub fn with_materiality_dp(mut self, dp: u32) -> Self {
        self.materiality_dp = dp.min(MAX_SCALE);
        self
    }

    /// Smallest quantity change that survives rounding, i.e. `10^-dp`.
    pub fn tolerance(&self) -> Decimal {
        Decimal::new(1, self.materiality_dp.min(MAX_SCALE))
    }
}

impl Portfolio {
    /// Orders that bring every targeted holding to its normalized weight.
    ///
    /// Uses the default materiality scale of [`MATERIALITY_DP`] places.
    /// See [`rebalance_with`](Self::rebalance_with).
    pub fn rebalance(&self) -> Result<Vec<Order>> {
        self.rebalance_with(&RebalanceOptions::default())
    }

    /// Orders that bring every targeted holding to its normalized weight.
    ///
    /// For each target, in the order targets were given:
    ///
    /// 1. `desired_value = total_value * raw_weight / total_weight`, multiplied
    ///    before dividing so large totals keep every digit
    /// 2. `change = (desired_value - current_value) / price`
    /// 3. `change` is rounded half-to-even to `materiality_dp` places; a zero
    ///    result emits nothing, otherwise the order carries `|rounded|` with
    ///    trailing zeros stripped, so equivalent inputs print identically.
    ///
    /// Holdings that are not targeted are left alone. Total value is taken
    /// over the holdings, not over the targets.
    ///
    /// # Errors
    ///
    /// - [`RebalanceError::EmptyTargetAllocation`] if target weights sum to zero
    /// - [`RebalanceError::UnknownSecurity`] if a held or targeted symbol has no price
    /// - [`RebalanceError::ZeroPricedSecurity`] if a targeted symbol is priced at zero
    ///
    /// Any error aborts the whole computation.
    pub fn rebalance_with(&self, options: &RebalanceOptions) -> Result<Vec<Order>> {
        let dp = options.materiality_dp.min(MAX_SCALE);
        let total_weight = self.target_weight_sum()?;
        let total_value = self.total_value()?;
        debug!(
            "rebalancing {} targets over total value {total_value}",
            self.desired_state.len()
        );

        let mut orders = Vec::with_capacity(self.desired_state.len());
        for (symbol, raw_weight) in &self.desired_state {
            let price = self.price(symbol.as_str())?;
            if price.is_zero() {
                return Err(RebalanceError::ZeroPricedSecurity {
                    symbol: symbol.clone(),
                });
            }

            let current_value = self.security_value(symbol.as_str())?;
            let target_value = desired_value(total_value, *raw_weight, total_weight)
                .ok_or(overflow("desired value"))?;
            let change = target_value
                .checked_sub(current_value)
                .and_then(|delta| delta.checked_div(price))
                .ok_or(overflow("quantity change"))?;

            let rounded = change.round_dp(dp);
            if rounded.is_zero() {
                trace!("{symbol}: change {change} below materiality, no order");
                continue;
            }

            let action = Action::from_change(rounded);
            let quantity = rounded.abs().normalize();
            trace!("{symbol}: {action} {quantity} (raw {change})");
            orders.push(Order::new(symbol, action, quantity));
        }

        debug!("rebalance produced {} orders", orders.len());
        Ok(orders)
    }
}

/// `total * weight / weight_sum`. Falls back to dividing first only when
/// the product does not fit.
fn desired_value(total: Decimal, weight: Decimal, weight_sum: Decimal) -> Option<Decimal> {
    total
        .checked_mul(weight)
        .and_then(|v| v.checked_div(weight_sum))
        .or_else(|| {
            weight
                .checked_div(weight_sum)
                .and_then(|w| total.checked_mul(w))
        })
}

fn overflow(context: &'static str) -> RebalanceError {
    RebalanceError::ArithmeticOverflow { context }
}
