//! TOML configuration loading and validation.
//!
//! Every section and key is optional; a missing `--config` runs on
//! [`Config::default`].

use std::path::{Path, PathBuf};

use rebalance::{MATERIALITY_DP, RebalanceOptions};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
    pub review: ReviewConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_materiality_dp")]
    pub materiality_dp: u32,
}

fn default_materiality_dp() -> u32 {
    MATERIALITY_DP
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            materiality_dp: default_materiality_dp(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Decimal places for securities that don't declare their own
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_precision() -> u32 {
    rebalance::Security::DEFAULT_PRECISION
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_max_orders")]
    pub max_orders: usize,
    /// Warn on any single order worth more than this
    #[serde(default)]
    pub max_order_value: Option<Decimal>,
}

fn default_max_orders() -> usize {
    50
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_orders: default_max_orders(),
            max_order_value: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.engine.materiality_dp > 28 {
            return Err(Error::Config("materiality_dp must be in [0, 28]".into()));
        }
        if self.output.precision > 28 {
            return Err(Error::Config("precision must be in [0, 28]".into()));
        }
        if self.review.max_orders == 0 {
            return Err(Error::Config("max_orders must be > 0".into()));
        }
        if let Some(limit) = self.review.max_order_value {
            if limit <= Decimal::ZERO {
                return Err(Error::Config("max_order_value must be > 0".into()));
            }
        }
        if self.logging.enabled && self.logging.audit_file.is_empty() {
            return Err(Error::Config("audit_file must not be empty".into()));
        }
        Ok(())
    }

    /// Engine options derived from `[engine]`.
    pub fn rebalance_options(&self) -> RebalanceOptions {
        RebalanceOptions::default().with_materiality_dp(self.engine.materiality_dp)
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
