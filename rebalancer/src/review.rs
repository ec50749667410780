//! Pre-trade plan review.
//!
//! Checks a computed order list against configured limits before it is
//! shown or written out.

use rebalance::{Decimal, Order, Portfolio, RebalanceOptions, Symbol};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::ReviewConfig;

/// Result of running all review checks.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub checks: Vec<ReviewCheck>,
}

/// A single review check result.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

/// Whether a check passed, warned, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Warn => write!(f, "WARN"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

impl ReviewReport {
    /// True if any check failed (not just warned).
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// True if any check warned.
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Warn)
    }
}

impl std::fmt::Display for ReviewReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PLAN REVIEW:")?;
        for check in &self.checks {
            writeln!(f, "  [{}] {}: {}", check.status, check.name, check.detail)?;
        }
        Ok(())
    }
}

/// Run all review checks over `orders`, computed from `portfolio`.
pub fn review_plan(
    portfolio: &Portfolio,
    orders: &[Order],
    config: &ReviewConfig,
    options: &RebalanceOptions,
) -> ReviewReport {
    let mut checks = Vec::new();
    let price_of = |sym: &Symbol| portfolio.price(sym.as_str()).unwrap_or(Decimal::ZERO);

    // 1. Order count
    let count_status = if orders.len() > config.max_orders {
        CheckStatus::Fail
    } else {
        CheckStatus::Pass
    };
    checks.push(ReviewCheck {
        name: "Order count",
        status: count_status,
        detail: format!(
            "{} orders {} {} limit",
            orders.len(),
            if count_status == CheckStatus::Pass {
                "<="
            } else {
                ">"
            },
            config.max_orders,
        ),
    });

    // 2. Order value: warn on each order above the limit
    match config.max_order_value {
        Some(limit) => {
            let mut oversized = 0;
            for order in orders {
                let notional = order.quantity.saturating_mul(price_of(&order.symbol));
                if notional > limit {
                    oversized += 1;
                    checks.push(ReviewCheck {
                        name: "Max order value",
                        status: CheckStatus::Warn,
                        detail: format!(
                            "{} {}: {} > {} max_order_value",
                            order.action,
                            order.symbol,
                            notional.round_dp(2),
                            limit,
                        ),
                    });
                }
            }
            if oversized == 0 {
                checks.push(ReviewCheck {
                    name: "Max order value",
                    status: CheckStatus::Pass,
                    detail: format!("all orders <= {limit}"),
                });
            }
        }
        None => checks.push(ReviewCheck {
            name: "Max order value",
            status: CheckStatus::Pass,
            detail: "no limit configured".into(),
        }),
    }

    // 3. Holdings without a target are never traded
    let targeted: FxHashSet<&str> = portfolio
        .desired_state()
        .iter()
        .map(|(s, _)| s.as_str())
        .collect();
    let untargeted: Vec<&str> = portfolio
        .current_state()
        .iter()
        .filter(|(s, qty)| !qty.is_zero() && !targeted.contains(s.as_str()))
        .map(|(s, _)| s.as_str())
        .collect();
    checks.push(if untargeted.is_empty() {
        ReviewCheck {
            name: "Untargeted holdings",
            status: CheckStatus::Pass,
            detail: "every holding has a target".into(),
        }
    } else {
        ReviewCheck {
            name: "Untargeted holdings",
            status: CheckStatus::Warn,
            detail: format!("left untouched: {}", untargeted.join(", ")),
        }
    });

    // 4. Value conservation: buys and sells should net to zero
    let net: Decimal = orders
        .iter()
        .map(|o| o.signed_quantity().saturating_mul(price_of(&o.symbol)))
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));
    // Every target's change is rounded, emitted or not
    let bound: Decimal = portfolio
        .desired_state()
        .iter()
        .map(|(s, _)| price_of(s).saturating_mul(options.tolerance()))
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));
    let conservation_status = if net.abs() <= bound {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };
    checks.push(ReviewCheck {
        name: "Value conservation",
        status: conservation_status,
        detail: format!(
            "net traded value {}",
            net.round_dp(options.materiality_dp).normalize()
        ),
    });

    // 5. Turnover, informational
    let gross: Decimal = orders
        .iter()
        .map(|o| o.quantity.saturating_mul(price_of(&o.symbol)))
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));
    let turnover_pct = portfolio
        .total_value()
        .ok()
        .and_then(|total| gross.checked_div(total))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
    let detail = match turnover_pct {
        Some(pct) => format!(
            "{} traded, {}% of portfolio value",
            gross.round_dp(2),
            pct.round_dp(2)
        ),
        None => format!("{} traded", gross.round_dp(2)),
    };
    checks.push(ReviewCheck {
        name: "Turnover",
        status: CheckStatus::Pass,
        detail,
    });

    ReviewReport { checks }
}
