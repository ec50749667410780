//! Trade direction: Buy or Sell

use std::fmt;

use rust_decimal::Decimal;

/// Direction of a rebalance order.
///
/// Order quantities are always positive; the direction lives here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// Direction implied by a signed quantity change. Zero maps to `Sell`,
    /// callers filter zero changes out before asking.
    #[inline]
    pub fn from_change(change: Decimal) -> Self {
        if change > Decimal::ZERO {
            Action::Buy
        } else {
            Action::Sell
        }
    }

    /// `1` for buys, `-1` for sells.
    #[inline]
    pub fn sign(self) -> Decimal {
        match self {
            Action::Buy => Decimal::ONE,
            Action::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    /// Returns the opposite direction.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Action::Buy => Action::Sell,
            Action::Sell => Action::Buy,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        };
        f.pad(s)
    }
}
