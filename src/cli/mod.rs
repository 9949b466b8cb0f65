// src/cli/mod.rs
// CLI module for tenant-probe commands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod inspect;
pub mod run;

// Re-export command handlers
pub use inspect::{list_plan, show_report};
pub use run::{execute, run_suite};

use crate::config::HarnessConfig;
use crate::report::OutputFormat;
use crate::suites::Suite;

#[derive(Parser)]
#[command(name = "tenant-probe")]
#[command(about = "Black-box scenario harness for multi-tenant HTTP APIs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a suite against the service (default)
    Run(RunArgs),

    /// Print a suite's plan without touching the network
    List {
        /// Suite to list
        #[arg(short, long)]
        suite: Option<Suite>,

        /// Leave out the cleanup scenario
        #[arg(long)]
        no_cleanup: bool,
    },

    /// Re-render a persisted report
    Report {
        /// Path to a results file written by `run`
        path: PathBuf,

        /// Output format (console, json)
        #[arg(short, long, default_value = "console")]
        format: OutputFormat,
    },
}

/// Flags for `run`; each one overrides file and environment settings
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Suite to run (standard, isolation)
    #[arg(short, long)]
    pub suite: Option<Suite>,

    /// Base URL of the service, e.g. http://localhost:8001
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path prefix of the API under the base URL
    #[arg(long)]
    pub api_prefix: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Where to write the results file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Skip deleting created resources at the end
    #[arg(long)]
    pub no_cleanup: bool,

    /// Output format (console, json)
    #[arg(short, long, default_value = "console")]
    pub format: OutputFormat,

    /// Config file (default: ~/.tenant-probe/config.toml)
    #[arg(short, long, env = "PROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Apply command-line overrides, the last configuration layer
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(suite) = self.suite {
            config.suite = suite;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(prefix) = &self.api_prefix {
            config.api_prefix = prefix.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(report) = &self.report {
            config.report_path = Some(report.clone());
        }
        if self.no_cleanup {
            config.cleanup = false;
        }
    }
}
