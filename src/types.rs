//! Core types: Symbol, Security

use std::borrow::Borrow;
use std::fmt;

use rust_decimal::Decimal;

/// Instrument identifier, unique within a portfolio snapshot.
///
/// Opaque to the engine: two symbols are the same instrument iff their
/// strings are equal. Implements `Borrow<str>` so maps keyed by `Symbol`
/// can be queried with a plain `&str`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The symbol as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty symbol, which snapshots reject.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&Symbol> for Symbol {
    fn from(s: &Symbol) -> Self {
        s.clone()
    }
}

/// A priced instrument.
///
/// `price` is a point-in-time value supplied by the caller and is never
/// mutated by the engine. `precision` is presentation-only: the number of
/// decimal places quantities of this instrument are shown with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Security {
    pub symbol: Symbol,
    pub price: Decimal,
    #[cfg_attr(feature = "serde", serde(default = "default_precision"))]
    pub precision: u32,
}

#[cfg(feature = "serde")]
fn default_precision() -> u32 {
    Security::DEFAULT_PRECISION
}

impl Security {
    /// Display precision used when none is given.
    pub const DEFAULT_PRECISION: u32 = 6;

    /// Create a security with the default display precision.
    pub fn new(symbol: impl Into<Symbol>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            precision: Self::DEFAULT_PRECISION,
        }
    }

    /// Builder: override the display precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Market value of `quantity` units, or `None` on overflow.
    #[inline]
    pub fn value_of(&self, quantity: Decimal) -> Option<Decimal> {
        self.price.checked_mul(quantity)
    }

    /// Round a quantity of this instrument for display.
    pub fn display_quantity(&self, quantity: Decimal) -> Decimal {
        quantity.round_dp(self.precision).normalize()
    }
}
