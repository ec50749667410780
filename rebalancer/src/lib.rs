//! rebalance-cli: snapshot files in, reviewed rebalance plans out.
//!
//! Loads a portfolio snapshot (prices, holdings, target weights) from JSON,
//! runs the `rebalance` engine on it, reviews the resulting orders against
//! configured limits, and keeps an audit trail of every run.

pub mod audit;
pub mod config;
pub mod drift;
pub mod error;
pub mod plan;
pub mod review;
pub mod snapshot;
