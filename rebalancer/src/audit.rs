//! JSONL audit trail.
//!
//! Each run appends events to an audit.jsonl file, one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rebalance::Order;
use serde::Serialize;

use crate::error::Result;
use crate::review::ReviewReport;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger. A disabled logger accepts and drops events.
pub struct AuditLog {
    writer: Option<BufWriter<fs::File>>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
        })
    }

    /// A logger that writes nothing (`[logging] enabled = false`).
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

pub fn log_run_started(audit: &mut AuditLog, command: &str, snapshot_file: &str) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "snapshot_file": snapshot_file,
        }),
    )
}

pub fn log_snapshot_loaded(
    audit: &mut AuditLog,
    securities: usize,
    holdings: usize,
    targets: usize,
) -> Result<()> {
    audit.log(
        "snapshot_loaded",
        serde_json::json!({
            "securities": securities,
            "holdings": holdings,
            "targets": targets,
        }),
    )
}

/// Log the computed order list. Quantities go out as strings to keep
/// every digit.
pub fn log_orders(audit: &mut AuditLog, orders: &[Order]) -> Result<()> {
    let order_data: Vec<_> = orders
        .iter()
        .map(|o| {
            serde_json::json!({
                "symbol": o.symbol.as_str(),
                "action": o.action.to_string(),
                "quantity": o.quantity.to_string(),
            })
        })
        .collect();

    audit.log("orders_computed", serde_json::json!({ "orders": order_data }))
}

pub fn log_review(audit: &mut AuditLog, report: &ReviewReport) -> Result<()> {
    let check_data: Vec<_> = report
        .checks
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "status": c.status.to_string(),
                "detail": c.detail,
            })
        })
        .collect();

    audit.log(
        "plan_reviewed",
        serde_json::json!({
            "passed": !report.has_failures(),
            "checks": check_data,
        }),
    )
}

pub fn log_plan_written(audit: &mut AuditLog, path: &Path, orders: usize) -> Result<()> {
    audit.log(
        "plan_written",
        serde_json::json!({
            "path": path.display().to_string(),
            "orders": orders,
        }),
    )
}

pub fn log_run_failed(audit: &mut AuditLog, error: &str) -> Result<()> {
    audit.log("run_failed", serde_json::json!({ "error": error }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalance::Action;
    use rust_decimal_macros::dec;

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log_simple("test_event").unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"test_event\""));
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log_simple("test").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn audit_log_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        AuditLog::open(&path).unwrap().log_simple("first").unwrap();
        AuditLog::open(&path).unwrap().log_simple("second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn orders_keep_exact_quantities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let orders = [Order::new("D", Action::Buy, dec!(6.666666666667))];
        {
            let mut log = AuditLog::open(&path).unwrap();
            log_orders(&mut log, &orders).unwrap();
        }

        let line = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["event"], "orders_computed");
        assert_eq!(value["orders"][0]["action"], "BUY");
        assert_eq!(value["orders"][0]["quantity"], "6.666666666667");
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let mut log = AuditLog::disabled();
        assert!(!log.is_enabled());
        log.log_simple("ignored").unwrap();
        log_run_failed(&mut log, "boom").unwrap();
    }
}
