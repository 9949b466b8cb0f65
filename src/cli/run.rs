// src/cli/run.rs
// CLI handler for `tenant-probe run`

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::info;
use uuid::Uuid;

use super::RunArgs;
use crate::actor::Roster;
use crate::config::HarnessConfig;
use crate::http::HttpDispatcher;
use crate::report::{RunMetadata, RunReport, get_reporter};
use crate::scenario::ScenarioRunner;
use crate::suites::PlanOptions;

/// Resolve configuration, run the suite, print and persist the report
pub async fn run_suite(args: RunArgs, verbose: bool) -> Result<ExitCode> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let report = execute(&config).await?;

    print!("{}", get_reporter(args.format).report(&report, verbose));

    let path = config.report_path();
    report
        .persist(&path)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    info!(path = %path.display(), "Detailed results saved");

    Ok(ExitCode::from(report.exit_code()))
}

/// Run the configured suite once and build its report.
///
/// Every run gets fresh identities derived from a new run id, so repeated
/// runs against the same service never collide.
pub async fn execute(config: &HarnessConfig) -> Result<RunReport> {
    let plan = config.suite.plan(&PlanOptions {
        cleanup: config.cleanup,
    });
    plan.validate()?;

    let run_id = Uuid::new_v4().simple().to_string();
    let run_tag = &run_id[..8];
    let roster = Roster::for_run(&plan.actors, run_tag, &config.username_prefix, &config.password);
    let test_users = roster.actors().map(|a| a.profile.username.clone()).collect();

    let api_url = config.api_url();
    let dispatcher = HttpDispatcher::new(api_url.clone(), config.timeout())?;

    info!(
        suite = %config.suite,
        run_id = %run_id,
        timeout_secs = config.timeout_secs,
        "Testing against {}",
        api_url
    );

    let outcome = ScenarioRunner::new(&dispatcher, roster).run(&plan).await;

    Ok(RunReport::new(
        &outcome.ledger,
        outcome.state,
        RunMetadata {
            run_id,
            suite: config.suite.to_string(),
            api_url,
            test_users,
            duration_ms: outcome.duration_ms,
        },
    ))
}
