//! Rebalance order: the engine's output value.

use std::fmt;

use rust_decimal::Decimal;

use crate::{Action, Symbol};

/// A single trade needed to move a holding toward its target weight.
///
/// Orders have no identity beyond their fields; two orders are equal when
/// symbol, action and quantity are equal (quantities compare numerically,
/// so `1` equals `1.000`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub symbol: Symbol,
    pub action: Action,
    /// Always strictly positive.
    pub quantity: Decimal,
}

impl Order {
    /// Create an order. `quantity` must be positive.
    pub fn new(symbol: impl Into<Symbol>, action: Action, quantity: Decimal) -> Self {
        debug_assert!(
            quantity > Decimal::ZERO,
            "order quantity must be positive, got {quantity}"
        );
        Self {
            symbol: symbol.into(),
            action,
            quantity,
        }
    }

    /// Quantity with the direction folded in: positive for buys.
    #[inline]
    pub fn signed_quantity(&self) -> Decimal {
        self.quantity * self.action.sign()
    }

    /// Signed value traded at `price`: positive cash out for buys,
    /// negative for sells. `None` on overflow.
    pub fn signed_notional(&self, price: Decimal) -> Option<Decimal> {
        self.signed_quantity().checked_mul(price)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.action,
            self.quantity.normalize(),
            self.symbol
        )
    }
}
