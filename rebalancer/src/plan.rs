//! Plan orchestrator: snapshot → orders → review → output.
//!
//! This is the main workflow that ties together all components.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rebalance::{Action, Decimal, Order, Portfolio};
use serde::Serialize;

use crate::audit::{self, AuditLog};
use crate::config::{Config, OutputFormat};
use crate::drift;
use crate::error::{Error, Result};
use crate::review;
use crate::snapshot::SnapshotFile;

/// Options for a `plan` run.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Print the plan as JSON instead of a table
    pub json: bool,
    /// Overwrite `out` without asking
    pub force: bool,
    /// Where to write the plan file, if anywhere
    pub out: Option<PathBuf>,
    pub snapshot_file: String,
}

/// A computed plan as written to disk or printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanFile {
    pub generated_at: DateTime<Utc>,
    pub snapshot_timestamp: Option<DateTime<Utc>>,
    pub orders: Vec<PlannedOrder>,
}

/// One order with its pricing context.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedOrder {
    pub symbol: String,
    pub action: Action,
    /// Exact engine quantity
    pub quantity: Decimal,
    /// Quantity rounded to the security's display precision
    pub display_quantity: Decimal,
    pub price: Decimal,
    pub notional: Decimal,
}

/// Attach prices and display quantities to the engine's orders.
pub fn build_plan(
    portfolio: &Portfolio,
    orders: &[Order],
    snapshot_timestamp: Option<DateTime<Utc>>,
) -> Result<PlanFile> {
    let mut planned = Vec::with_capacity(orders.len());
    for order in orders {
        let security = portfolio.security(order.symbol.as_str()).ok_or_else(|| {
            rebalance::RebalanceError::UnknownSecurity {
                symbol: order.symbol.clone(),
            }
        })?;
        let notional = security.value_of(order.quantity).ok_or_else(|| {
            rebalance::RebalanceError::ArithmeticOverflow {
                context: "order notional",
            }
        })?;
        planned.push(PlannedOrder {
            symbol: order.symbol.to_string(),
            action: order.action,
            quantity: order.quantity,
            display_quantity: security.display_quantity(order.quantity),
            price: security.price,
            notional,
        });
    }

    Ok(PlanFile {
        generated_at: Utc::now(),
        snapshot_timestamp,
        orders: planned,
    })
}

/// Render the plan as a table.
pub fn format_plan(plan: &PlanFile) -> String {
    let mut out = String::from("REBALANCE ORDERS:\n");
    out.push_str(&format!(
        "  {:>3}  {:6} {:8} {:>16} {:>12} {:>14}\n",
        "#", "Action", "Symbol", "Quantity", "Price", "Notional"
    ));
    for (i, o) in plan.orders.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}  {:6} {:8} {:>16} {:>12} {:>14}\n",
            i + 1,
            o.action,
            o.symbol,
            o.display_quantity.to_string(),
            o.price.to_string(),
            o.notional.round_dp(2).to_string(),
        ));
    }
    out
}

/// Serialize the plan as pretty JSON.
pub fn plan_json(plan: &PlanFile) -> Result<String> {
    serde_json::to_string_pretty(plan).map_err(Error::PlanEncode)
}

/// Write the plan to `path`. An existing file is only replaced with `force`
/// or after the user confirms. Returns `false` if the user declined.
pub fn write_plan(path: &Path, plan: &PlanFile, force: bool) -> Result<bool> {
    if path.exists() && !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))?;
        if !confirmed {
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, plan_json(plan)? + "\n")?;
    Ok(true)
}

fn open_audit(config: &Config) -> Result<AuditLog> {
    if config.logging.enabled {
        AuditLog::open(&config.audit_path())
    } else {
        Ok(AuditLog::disabled())
    }
}

/// Compute, review and emit a rebalance plan.
pub fn run(config: &Config, snapshot: &SnapshotFile, opts: &PlanOptions) -> Result<()> {
    let mut audit = open_audit(config)?;
    audit::log_run_started(&mut audit, "plan", &opts.snapshot_file)?;

    let result = run_plan(config, snapshot, opts, &mut audit);
    if let Err(e) = &result {
        audit::log_run_failed(&mut audit, &e.to_string())?;
    }
    result
}

fn run_plan(
    config: &Config,
    snapshot: &SnapshotFile,
    opts: &PlanOptions,
    audit: &mut AuditLog,
) -> Result<()> {
    let json = opts.json || config.output.format == OutputFormat::Json;

    // 1. Build the engine snapshot
    let portfolio = snapshot.to_portfolio(config.output.precision)?;
    audit::log_snapshot_loaded(
        audit,
        portfolio.securities().len(),
        portfolio.current_state().len(),
        portfolio.desired_state().len(),
    )?;

    if !json {
        display_allocation(&portfolio)?;
    }

    // 2. Compute orders
    let options = config.rebalance_options();
    let orders = portfolio.rebalance_with(&options)?;
    info!("Computed {} orders", orders.len());

    if orders.is_empty() {
        if json {
            let plan = build_plan(&portfolio, &orders, snapshot.timestamp)?;
            println!("{}", plan_json(&plan)?);
        } else {
            println!("\nNo rebalancing needed: portfolio matches target.");
        }
        audit.log_simple("no_rebalance_needed")?;
        return Ok(());
    }
    audit::log_orders(audit, &orders)?;

    // 3. Display the plan
    let plan = build_plan(&portfolio, &orders, snapshot.timestamp)?;
    if json {
        println!("{}", plan_json(&plan)?);
    } else {
        print!("\n{}", format_plan(&plan));
        println!();
    }

    // 4. Review
    let report = review::review_plan(&portfolio, &orders, &config.review, &options);
    if json {
        eprint!("{report}");
    } else {
        print!("{report}");
    }
    audit::log_review(audit, &report)?;

    if report.has_failures() {
        return Err(Error::ReviewFailed("one or more review checks failed".into()));
    }
    if report.has_warnings() {
        warn!("Plan review raised warnings");
    }

    // 5. Write the plan file
    if let Some(path) = &opts.out {
        if write_plan(path, &plan, opts.force)? {
            audit::log_plan_written(audit, path, plan.orders.len())?;
            info!("Plan written to {}", path.display());
        } else {
            audit.log(
                "plan_write_declined",
                serde_json::json!({ "path": path.display().to_string() }),
            )?;
            return Err(Error::Aborted(format!("{} not overwritten", path.display())));
        }
    }

    Ok(())
}

/// Print current and normalized target allocations.
pub fn show_weights(config: &Config, snapshot: &SnapshotFile) -> Result<()> {
    let portfolio = snapshot.to_portfolio(config.output.precision)?;
    display_allocation(&portfolio)
}

/// Print the drift report.
pub fn show_drift(config: &Config, snapshot: &SnapshotFile) -> Result<()> {
    let portfolio = snapshot.to_portfolio(config.output.precision)?;
    let report = drift::drift_report(&portfolio)?;
    debug!("Tracking error {:.4}%", report.tracking_error_pct);
    print!("{report}");
    Ok(())
}

// === Helpers ===

fn display_allocation(portfolio: &Portfolio) -> Result<()> {
    let total = portfolio.total_value()?;

    let mut current = Vec::new();
    for (symbol, weight) in portfolio.security_percentages()? {
        let qty = portfolio.quantity_held(symbol.as_str());
        let value = portfolio.security_value(symbol.as_str())?;
        current.push((symbol, qty, value, drift::percent(weight)?));
    }
    let desired = portfolio
        .normalized_weights()?
        .into_iter()
        .map(|(symbol, weight)| Ok((symbol, drift::percent(weight)?)))
        .collect::<Result<Vec<_>>>()?;

    if current.is_empty() {
        println!("No holdings.");
    } else {
        println!("CURRENT ALLOCATION (total value {}):", total.round_dp(2));
        for (symbol, qty, value, pct) in &current {
            println!(
                "  {:8} {:>16} = {:>14}  ({}%)",
                symbol,
                qty.normalize().to_string(),
                value.round_dp(2).to_string(),
                pct,
            );
        }
    }

    println!("DESIRED ALLOCATION:");
    for (symbol, pct) in &desired {
        println!("  {:8} {:>8}%", symbol, pct.to_string());
    }
    Ok(())
}
