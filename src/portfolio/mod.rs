//! Portfolio snapshot: prices, holdings, and target weights at one instant.
//!
//! A [`Portfolio`] is immutable once built. Its constructor copies the three
//! inputs, so callers may keep mutating their own collections while a
//! computation runs on the snapshot. Every query is a pure function of the
//! snapshot, which makes a `&Portfolio` safe to share across threads.
//!
//! Holdings and targets keep their insertion order: [`Portfolio::rebalance`]
//! emits orders in the order the targets were given.
//!
//! # Example
//!
//! ```
//! use rebalance::{Action, Order, Portfolio, Security};
//! use rust_decimal_macros::dec;
//!
//! let portfolio = Portfolio::new(
//!     [Security::new("A", dec!(1)), Security::new("B", dec!(1))],
//!     [("A", dec!(2)), ("B", dec!(1))],
//!     [("A", dec!(1)), ("B", dec!(2))],
//! )
//! .unwrap();
//!
//! assert_eq!(portfolio.total_value().unwrap(), dec!(3));
//! assert_eq!(
//!     portfolio.rebalance().unwrap(),
//!     vec![
//!         Order::new("A", Action::Sell, dec!(1)),
//!         Order::new("B", Action::Buy, dec!(1)),
//!     ]
//! );
//! ```

mod drift;
mod rebalance;

pub use drift::DriftEntry;
pub use rebalance::{MATERIALITY_DP, RebalanceOptions};

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{RebalanceError, Result};
use crate::types::{Security, Symbol};

/// An immutable view of prices, holdings, and target weights.
#[derive(Clone, Debug)]
pub struct Portfolio {
    /// Securities in the order given
    securities: Vec<Security>,
    /// Symbol -> index into `securities`
    security_index: FxHashMap<Symbol, usize>,
    /// Held quantities in insertion order
    current_state: Vec<(Symbol, Decimal)>,
    /// Symbol -> held quantity
    holdings: FxHashMap<Symbol, Decimal>,
    /// Raw (unnormalized) target weights in insertion order
    desired_state: Vec<(Symbol, Decimal)>,
}

impl Portfolio {
    /// Build a snapshot from securities, held quantities, and raw target weights.
    ///
    /// Structural problems are rejected here: empty or duplicated symbols,
    /// negative prices, negative weights. Whether every held or targeted
    /// symbol has a price is checked by the computations that need it, so a
    /// snapshot with an unpriced target still builds and its `rebalance`
    /// reports [`RebalanceError::UnknownSecurity`].
    ///
    /// Holdings may be negative (short positions).
    pub fn new<S, C, D, KC, KD>(securities: S, current_state: C, desired_state: D) -> Result<Self>
    where
        S: IntoIterator<Item = Security>,
        C: IntoIterator<Item = (KC, Decimal)>,
        D: IntoIterator<Item = (KD, Decimal)>,
        KC: Into<Symbol>,
        KD: Into<Symbol>,
    {
        let securities: Vec<Security> = securities.into_iter().collect();
        let mut security_index =
            FxHashMap::with_capacity_and_hasher(securities.len(), Default::default());
        for (i, security) in securities.iter().enumerate() {
            check_symbol(&security.symbol, "securities")?;
            if security.price < Decimal::ZERO {
                return Err(RebalanceError::NegativePrice {
                    symbol: security.symbol.clone(),
                    price: security.price,
                });
            }
            if security_index.insert(security.symbol.clone(), i).is_some() {
                return Err(duplicate(&security.symbol, "securities"));
            }
        }

        let current_state: Vec<(Symbol, Decimal)> = current_state
            .into_iter()
            .map(|(sym, qty)| (sym.into(), qty))
            .collect();
        let mut holdings =
            FxHashMap::with_capacity_and_hasher(current_state.len(), Default::default());
        for (sym, qty) in &current_state {
            check_symbol(sym, "current_state")?;
            if holdings.insert(sym.clone(), *qty).is_some() {
                return Err(duplicate(sym, "current_state"));
            }
        }

        let desired_state: Vec<(Symbol, Decimal)> = desired_state
            .into_iter()
            .map(|(sym, weight)| (sym.into(), weight))
            .collect();
        let mut seen = FxHashSet::default();
        for (sym, weight) in &desired_state {
            check_symbol(sym, "desired_state")?;
            if *weight < Decimal::ZERO {
                return Err(RebalanceError::NegativeWeight {
                    symbol: sym.clone(),
                    weight: *weight,
                });
            }
            if !seen.insert(sym) {
                return Err(duplicate(sym, "desired_state"));
            }
        }

        Ok(Self {
            securities,
            security_index,
            current_state,
            holdings,
            desired_state,
        })
    }

    // === Queries ===

    /// All securities, in the order given.
    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    /// Look up a security by symbol.
    pub fn security(&self, symbol: &str) -> Option<&Security> {
        self.security_index.get(symbol).map(|&i| &self.securities[i])
    }

    /// Held quantities, in insertion order.
    pub fn current_state(&self) -> &[(Symbol, Decimal)] {
        &self.current_state
    }

    /// Raw target weights, in insertion order.
    pub fn desired_state(&self) -> &[(Symbol, Decimal)] {
        &self.desired_state
    }

    /// Quantity held of `symbol`; zero when absent from `current_state`.
    #[inline]
    pub fn quantity_held(&self, symbol: &str) -> Decimal {
        self.holdings.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Price of `symbol`, or [`RebalanceError::UnknownSecurity`].
    pub fn price(&self, symbol: &str) -> Result<Decimal> {
        self.security(symbol)
            .map(|s| s.price)
            .ok_or_else(|| RebalanceError::UnknownSecurity {
                symbol: Symbol::new(symbol),
            })
    }

    // === Valuation ===

    /// Market value of the holding in `symbol`: price times quantity held.
    ///
    /// Unheld symbols are worth zero, but still need a price.
    pub fn security_value(&self, symbol: &str) -> Result<Decimal> {
        let price = self.price(symbol)?;
        price
            .checked_mul(self.quantity_held(symbol))
            .ok_or(RebalanceError::ArithmeticOverflow {
                context: "security value",
            })
    }

    /// Total market value of every holding in `current_state`.
    ///
    /// A holding without a price fails with [`RebalanceError::UnknownSecurity`]
    /// rather than being skipped.
    pub fn total_value(&self) -> Result<Decimal> {
        self.current_state
            .iter()
            .try_fold(Decimal::ZERO, |acc, (sym, _)| {
                let value = self.security_value(sym.as_str())?;
                acc.checked_add(value)
                    .ok_or(RebalanceError::ArithmeticOverflow {
                        context: "total value",
                    })
            })
    }

    /// Share of total value held in each `current_state` symbol.
    ///
    /// When the total value is zero the result is empty: the fractions are
    /// undefined and simply omitted.
    pub fn security_percentages(&self) -> Result<Vec<(Symbol, Decimal)>> {
        let total = self.total_value()?;
        if total.is_zero() {
            return Ok(Vec::new());
        }
        self.current_state
            .iter()
            .map(|(sym, _)| {
                let value = self.security_value(sym.as_str())?;
                let share = value
                    .checked_div(total)
                    .ok_or(RebalanceError::ArithmeticOverflow {
                        context: "security percentage",
                    })?;
                Ok((sym.clone(), share))
            })
            .collect()
    }

    /// Target weights scaled to sum to one, in insertion order.
    ///
    /// Only relative magnitudes of the raw weights matter: `{A: 1, B: 1}` and
    /// `{A: 100, B: 100}` normalize identically. Fails with
    /// [`RebalanceError::EmptyTargetAllocation`] when the raw weights sum to
    /// zero, including when there are no targets at all.
    pub fn normalized_weights(&self) -> Result<Vec<(Symbol, Decimal)>> {
        let total_desired = self.target_weight_sum()?;
        self.desired_state
            .iter()
            .map(|(sym, w)| {
                let weight =
                    w.checked_div(total_desired)
                        .ok_or(RebalanceError::ArithmeticOverflow {
                            context: "weight normalization",
                        })?;
                Ok((sym.clone(), weight))
            })
            .collect()
    }

    // === Internal ===

    /// Sum of the raw target weights; [`RebalanceError::EmptyTargetAllocation`]
    /// when it is zero.
    fn target_weight_sum(&self) -> Result<Decimal> {
        let total = self
            .desired_state
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, w)| acc.checked_add(*w))
            .ok_or(RebalanceError::ArithmeticOverflow {
                context: "target weight sum",
            })?;
        if total.is_zero() {
            return Err(RebalanceError::EmptyTargetAllocation);
        }
        Ok(total)
    }
}

fn check_symbol(symbol: &Symbol, field: &'static str) -> Result<()> {
    if symbol.is_empty() {
        return Err(RebalanceError::EmptySymbol { field });
    }
    Ok(())
}

fn duplicate(symbol: &Symbol, field: &'static str) -> RebalanceError {
    RebalanceError::DuplicateSymbol {
        symbol: symbol.clone(),
        field,
    }
}
