//! Portfolio snapshot file (snapshot.json) loading and validation.
//!
//! Lists rather than JSON objects carry every collection, so the order
//! targets are written in is the order orders come out in.

use std::path::Path;

use chrono::{DateTime, Utc};
use rebalance::{Portfolio, Security, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A portfolio snapshot as written by a loader or by hand.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub securities: Vec<SecurityEntry>,
    #[serde(default)]
    pub current: Vec<HoldingEntry>,
    #[serde(default)]
    pub desired: Vec<TargetEntry>,
}

/// A priced instrument.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityEntry {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub precision: Option<u32>,
}

/// A held quantity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HoldingEntry {
    pub symbol: String,
    pub quantity: Decimal,
}

/// A raw (unnormalized) target weight.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetEntry {
    pub symbol: String,
    pub weight: Decimal,
}

impl SnapshotFile {
    /// Load and validate a snapshot.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::SnapshotRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SnapshotFile = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// File-level checks. Structural checks on the data itself (duplicates,
    /// negative prices or weights) are left to [`Portfolio::new`].
    fn validate(&self) -> Result<()> {
        if self.securities.is_empty() {
            return Err(Error::Snapshot("securities list is empty".into()));
        }
        for s in &self.securities {
            if let Some(p) = s.precision {
                if p > 28 {
                    return Err(Error::Snapshot(format!(
                        "precision for {} ({p}) exceeds 28",
                        s.symbol
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the engine snapshot, filling missing precisions with `default_precision`.
    pub fn to_portfolio(&self, default_precision: u32) -> Result<Portfolio> {
        let securities = self.securities.iter().map(|s| {
            Security::new(s.symbol.as_str(), s.price)
                .with_precision(s.precision.unwrap_or(default_precision))
        });
        let current = self
            .current
            .iter()
            .map(|h| (Symbol::new(h.symbol.as_str()), h.quantity));
        let desired = self
            .desired
            .iter()
            .map(|t| (Symbol::new(t.symbol.as_str()), t.weight));
        Ok(Portfolio::new(securities, current, desired)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalance::RebalanceError;
    use rust_decimal_macros::dec;

    fn valid_json() -> &'static str {
        r#"{
            "timestamp": "2026-02-08T15:30:00Z",
            "securities": [
                { "symbol": "AAPL", "price": "185.37", "precision": 0 },
                { "symbol": "MSFT", "price": "410.12" },
                { "symbol": "SPY",  "price": 512 }
            ],
            "current": [
                { "symbol": "AAPL", "quantity": "40" },
                { "symbol": "MSFT", "quantity": "7.5" }
            ],
            "desired": [
                { "symbol": "SPY",  "weight": "2" },
                { "symbol": "AAPL", "weight": "1" },
                { "symbol": "MSFT", "weight": "1" }
            ]
        }"#
    }

    #[test]
    fn parse_valid_snapshot() {
        let snap = SnapshotFile::from_json(valid_json()).unwrap();
        assert_eq!(snap.securities.len(), 3);
        assert_eq!(snap.securities[0].price, dec!(185.37));
        assert_eq!(snap.securities[2].price, dec!(512));
        assert_eq!(snap.current[1].quantity, dec!(7.5));
        assert_eq!(snap.desired[0].symbol, "SPY");
        assert!(snap.timestamp.is_some());
    }

    #[test]
    fn to_portfolio_keeps_target_order() {
        let portfolio = SnapshotFile::from_json(valid_json())
            .unwrap()
            .to_portfolio(6)
            .unwrap();
        let symbols: Vec<&str> = portfolio
            .desired_state()
            .iter()
            .map(|(s, _)| s.as_str())
            .collect();
        assert_eq!(symbols, ["SPY", "AAPL", "MSFT"]);
    }

    #[test]
    fn to_portfolio_fills_default_precision() {
        let portfolio = SnapshotFile::from_json(valid_json())
            .unwrap()
            .to_portfolio(3)
            .unwrap();
        assert_eq!(portfolio.security("AAPL").unwrap().precision, 0);
        assert_eq!(portfolio.security("MSFT").unwrap().precision, 3);
    }

    #[test]
    fn holdings_and_targets_are_optional() {
        let json = r#"{ "securities": [{ "symbol": "A", "price": "1" }] }"#;
        let snap = SnapshotFile::from_json(json).unwrap();
        assert!(snap.current.is_empty());
        assert!(snap.desired.is_empty());
        assert!(snap.timestamp.is_none());
    }

    #[test]
    fn reject_empty_securities() {
        let json = r#"{ "securities": [] }"#;
        assert!(matches!(
            SnapshotFile::from_json(json),
            Err(Error::Snapshot(_))
        ));
    }

    #[test]
    fn reject_excessive_precision() {
        let json = r#"{ "securities": [{ "symbol": "A", "price": "1", "precision": 40 }] }"#;
        assert!(SnapshotFile::from_json(json).is_err());
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            SnapshotFile::from_json("{ not json"),
            Err(Error::SnapshotParse(_))
        ));
    }

    #[test]
    fn duplicate_target_surfaces_engine_error() {
        let json = r#"{
            "securities": [{ "symbol": "A", "price": "1" }],
            "desired": [
                { "symbol": "A", "weight": "1" },
                { "symbol": "A", "weight": "2" }
            ]
        }"#;
        let err = SnapshotFile::from_json(json)
            .unwrap()
            .to_portfolio(6)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Engine(RebalanceError::DuplicateSymbol { .. })
        ));
    }

    #[test]
    fn load_missing_file() {
        let err = SnapshotFile::load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, Error::SnapshotRead { .. }));
    }
}
