// src/main.rs
// tenant-probe - black-box scenario harness for multi-tenant HTTP APIs

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tenant_probe::cli::{self, Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env before anything reads PROBE_* variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the report
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => cli::run_suite(args, cli.verbose).await,
        Commands::List { suite, no_cleanup } => {
            cli::list_plan(suite.unwrap_or_default(), !no_cleanup)
        }
        Commands::Report { path, format } => cli::show_report(&path, format, cli.verbose),
    }
}
