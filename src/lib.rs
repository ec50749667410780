//! # rebalance
//!
//! Deterministic portfolio rebalancing over exact decimals.
//!
//! Given a snapshot of prices, held quantities, and raw target weights, the
//! engine computes the buy/sell quantities that move each holding's share of
//! total value onto its target share.
//!
//! ## Features
//!
//! - **Unnormalized targets**: only relative weights matter, `{A: 1, B: 3}`
//!   and `{A: 25, B: 75}` are the same allocation
//! - **Exact arithmetic**: [`rust_decimal::Decimal`] throughout, no binary floats
//! - **Materiality threshold**: quantity changes that round to zero at 12
//!   decimal places emit no order
//! - **Deterministic order**: orders come out in the order targets were given
//! - **No partial results**: invalid input aborts with a [`RebalanceError`]
//!
//! ## Quick Start
//!
//! ```
//! use rebalance::{Action, Order, Portfolio, Security};
//! use rust_decimal_macros::dec;
//!
//! let portfolio = Portfolio::new(
//!     [
//!         Security::new("A", dec!(1)),
//!         Security::new("B", dec!(1)),
//!         Security::new("C", dec!(1)),
//!     ],
//!     [("A", dec!(3)), ("B", dec!(2)), ("C", dec!(1))],
//!     [("A", dec!(1)), ("B", dec!(1)), ("C", dec!(1))],
//! )
//! .unwrap();
//!
//! let orders = portfolio.rebalance().unwrap();
//! assert_eq!(
//!     orders,
//!     vec![
//!         Order::new("A", Action::Sell, dec!(1)),
//!         Order::new("C", Action::Buy, dec!(1)),
//!     ]
//! );
//! ```
//!
//! ## Failures
//!
//! | Error | Cause |
//! |-------|-------|
//! | `EmptyTargetAllocation` | target weights sum to zero (or there are none) |
//! | `UnknownSecurity` | a held or targeted symbol has no price |
//! | `ZeroPricedSecurity` | a targeted symbol is priced at zero |
//!
//! ```
//! use rebalance::{Portfolio, RebalanceError, Security, Symbol};
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//!
//! let portfolio = Portfolio::new(
//!     [Security::new("A", dec!(1))],
//!     [("A", dec!(1))],
//!     Vec::<(Symbol, Decimal)>::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(portfolio.rebalance(), Err(RebalanceError::EmptyTargetAllocation));
//! ```

mod action;
mod error;
mod order;
pub mod portfolio;
mod types;

// Re-export public API
pub use action::Action;
pub use error::{RebalanceError, Result};
pub use order::Order;
pub use portfolio::{DriftEntry, MATERIALITY_DP, Portfolio, RebalanceOptions};
pub use types::{Security, Symbol};

pub use rust_decimal::Decimal;
