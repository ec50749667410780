//! Integration tests for the plan workflow: snapshot file → plan file + audit.

use std::path::Path;

use rebalance::{Action, Decimal};
use rebalance_cli::config::Config;
use rebalance_cli::error::Error;
use rebalance_cli::plan::{self, PlanOptions};
use rebalance_cli::snapshot::SnapshotFile;
use rust_decimal_macros::dec;

fn snapshot_json() -> &'static str {
    r#"{
        "timestamp": "2026-02-08T15:30:00Z",
        "securities": [
            { "symbol": "A", "price": "1" },
            { "symbol": "B", "price": "1" },
            { "symbol": "C", "price": "1" }
        ],
        "current": [
            { "symbol": "A", "quantity": "10" },
            { "symbol": "B", "quantity": "10" },
            { "symbol": "C", "quantity": "0" }
        ],
        "desired": [
            { "symbol": "A", "weight": "1" },
            { "symbol": "B", "weight": "1" },
            { "symbol": "C", "weight": "1" }
        ]
    }"#
}

fn config_in(dir: &Path, extra: &str) -> Config {
    let toml = format!(
        "[logging]\ndir = \"{}\"\naudit_file = \"audit.jsonl\"\n{extra}",
        dir.display()
    );
    Config::from_toml(&toml).unwrap()
}

fn audit_events(config: &Config) -> Vec<String> {
    std::fs::read_to_string(config.audit_path())
        .unwrap()
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["event"].as_str().unwrap().to_string()
        })
        .collect()
}

// ============================================================================
// plan run
// ============================================================================

#[test]
fn plan_writes_file_and_audit() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "");
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();
    let out = dir.path().join("plan.json");

    let opts = PlanOptions {
        json: false,
        force: true,
        out: Some(out.clone()),
        snapshot_file: "snapshot.json".into(),
    };
    plan::run(&config, &snapshot, &opts).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let orders = written["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0]["symbol"], "A");
    assert_eq!(orders[0]["action"], "SELL");
    assert_eq!(orders[0]["quantity"], "3.333333333333");
    assert_eq!(orders[2]["symbol"], "C");
    assert_eq!(orders[2]["action"], "BUY");
    assert_eq!(orders[2]["quantity"], "6.666666666667");
    assert_eq!(written["snapshot_timestamp"], "2026-02-08T15:30:00Z");

    assert_eq!(
        audit_events(&config),
        [
            "run_started",
            "snapshot_loaded",
            "orders_computed",
            "plan_reviewed",
            "plan_written"
        ]
    );
}

#[test]
fn balanced_snapshot_needs_no_orders() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "");
    let json = r#"{
        "securities": [{ "symbol": "A", "price": "2" }, { "symbol": "B", "price": "4" }],
        "current": [{ "symbol": "A", "quantity": "2" }, { "symbol": "B", "quantity": "1" }],
        "desired": [{ "symbol": "A", "weight": "1" }, { "symbol": "B", "weight": "1" }]
    }"#;
    let snapshot = SnapshotFile::from_json(json).unwrap();
    let out = dir.path().join("plan.json");

    let opts = PlanOptions {
        out: Some(out.clone()),
        ..Default::default()
    };
    plan::run(&config, &snapshot, &opts).unwrap();

    assert!(!out.exists());
    assert_eq!(
        audit_events(&config),
        ["run_started", "snapshot_loaded", "no_rebalance_needed"]
    );
}

#[test]
fn review_failure_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "[review]\nmax_orders = 2\n");
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();
    let out = dir.path().join("plan.json");

    let opts = PlanOptions {
        force: true,
        out: Some(out.clone()),
        ..Default::default()
    };
    let err = plan::run(&config, &snapshot, &opts).unwrap_err();

    assert!(matches!(err, Error::ReviewFailed(_)));
    assert!(!out.exists());
    assert_eq!(audit_events(&config).last().unwrap(), "run_failed");
}

#[test]
fn engine_error_is_audited() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "");
    let json = r#"{
        "securities": [{ "symbol": "A", "price": "0" }],
        "current": [{ "symbol": "A", "quantity": "1" }],
        "desired": [{ "symbol": "A", "weight": "1" }]
    }"#;
    let snapshot = SnapshotFile::from_json(json).unwrap();

    let err = plan::run(&config, &snapshot, &PlanOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        Error::Engine(rebalance::RebalanceError::ZeroPricedSecurity { .. })
    ));
    assert_eq!(audit_events(&config).last().unwrap(), "run_failed");
}

#[test]
fn disabled_logging_leaves_no_audit_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), "");
    config.logging.enabled = false;
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();

    plan::run(&config, &snapshot, &PlanOptions::default()).unwrap();

    assert!(!config.audit_path().exists());
}

#[test]
fn materiality_from_config_reaches_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "[engine]\nmateriality_dp = 2\n");
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();

    let portfolio = snapshot.to_portfolio(config.output.precision).unwrap();
    let orders = portfolio
        .rebalance_with(&config.rebalance_options())
        .unwrap();

    assert_eq!(orders[0].action, Action::Sell);
    assert_eq!(orders[0].quantity, dec!(3.33));
    assert_eq!(orders[2].quantity, dec!(6.67));
    assert!(orders.iter().all(|o| o.quantity.scale() <= 2));
}

// ============================================================================
// weights / drift
// ============================================================================

#[test]
fn weights_and_drift_run_on_snapshot() {
    let config = Config::default();
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();

    plan::show_weights(&config, &snapshot).unwrap();
    plan::show_drift(&config, &snapshot).unwrap();
}

#[test]
fn drift_reports_every_symbol() {
    let snapshot = SnapshotFile::from_json(snapshot_json()).unwrap();
    let portfolio = snapshot.to_portfolio(6).unwrap();
    let report = rebalance_cli::drift::drift_report(&portfolio).unwrap();

    assert_eq!(report.entries.len(), 3);
    let c = &report.entries[2];
    assert_eq!(c.current_weight, Decimal::ZERO);
    assert!(c.difference() < Decimal::ZERO);
}

#[test]
fn offsetting_short_reports_overflow_instead_of_panicking() {
    // Total value 1e-18, so A's current weight is 1e28.
    let json = r#"{
        "securities": [{ "symbol": "A", "price": "1" }, { "symbol": "B", "price": "1" }],
        "current": [
            { "symbol": "A", "quantity": "10000000000" },
            { "symbol": "B", "quantity": "-9999999999.999999999999999999" }
        ],
        "desired": [{ "symbol": "A", "weight": "1" }]
    }"#;
    let config = Config::default();
    let snapshot = SnapshotFile::from_json(json).unwrap();

    let is_overflow = |r: Result<(), Error>| {
        matches!(
            r,
            Err(Error::Engine(
                rebalance::RebalanceError::ArithmeticOverflow { .. }
            ))
        )
    };
    assert!(is_overflow(plan::show_weights(&config, &snapshot)));
    assert!(is_overflow(plan::show_drift(&config, &snapshot)));
}
