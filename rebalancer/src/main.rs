//! CLI entry point for the portfolio rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use rebalance_cli::config::Config;
use rebalance_cli::error::Error;
use rebalance_cli::plan::{self, PlanOptions};
use rebalance_cli::snapshot::SnapshotFile;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Portfolio rebalancer: holdings + target weights → orders")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute, review and print rebalance orders
    Plan {
        /// Path to snapshot.json
        snapshot: PathBuf,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,

        /// Also write the plan as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Overwrite --out without asking
        #[arg(long)]
        force: bool,
    },

    /// Show current and normalized target weights
    Weights {
        /// Path to snapshot.json
        snapshot: PathBuf,
    },

    /// Compare current weights against targets
    Drift {
        /// Path to snapshot.json
        snapshot: PathBuf,
    },
}

fn load_snapshot(path: &Path) -> SnapshotFile {
    match SnapshotFile::load(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading snapshot: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    let result = match cli.command {
        Command::Plan {
            snapshot,
            json,
            out,
            force,
        } => {
            let snap = load_snapshot(&snapshot);
            let opts = PlanOptions {
                json,
                force,
                out,
                snapshot_file: snapshot.display().to_string(),
            };
            plan::run(&config, &snap, &opts)
        }
        Command::Weights { snapshot } => plan::show_weights(&config, &load_snapshot(&snapshot)),
        Command::Drift { snapshot } => plan::show_drift(&config, &load_snapshot(&snapshot)),
    };

    if let Err(e) = result {
        match &e {
            Error::ReviewFailed(msg) => {
                eprintln!("\nAborted: {msg}");
                process::exit(2);
            }
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
