//! Errors raised while building a snapshot or computing a rebalance.

use rust_decimal::Decimal;

use crate::types::Symbol;

/// Every failure the engine can report.
///
/// All variants abort the whole computation: no partial order list is ever
/// returned alongside an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RebalanceError {
    /// Desired weights sum to zero, so they cannot be normalized.
    #[error("target allocation is empty: desired weights sum to zero")]
    EmptyTargetAllocation,

    /// A targeted security has price zero; no finite quantity expresses its value.
    #[error("security {symbol} has a zero price")]
    ZeroPricedSecurity { symbol: Symbol },

    /// A held or targeted symbol has no price in the snapshot.
    #[error("unknown security {symbol}: no price in snapshot")]
    UnknownSecurity { symbol: Symbol },

    /// A symbol appears more than once in one snapshot input.
    #[error("duplicate symbol {symbol} in {field}")]
    DuplicateSymbol { symbol: Symbol, field: &'static str },

    /// A snapshot input contains the empty symbol.
    #[error("empty symbol in {field}")]
    EmptySymbol { field: &'static str },

    /// Prices must be non-negative.
    #[error("security {symbol} has negative price {price}")]
    NegativePrice { symbol: Symbol, price: Decimal },

    /// Desired weights must be non-negative.
    #[error("target weight for {symbol} is negative ({weight})")]
    NegativeWeight { symbol: Symbol, weight: Decimal },

    /// A decimal operation left the representable range.
    #[error("arithmetic overflow computing {context}")]
    ArithmeticOverflow { context: &'static str },
}

pub type Result<T> = std::result::Result<T, RebalanceError>;
