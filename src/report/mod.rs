// src/report/mod.rs
// Run reports: the persisted artifact and its renderers

pub mod console;
pub mod json;
pub mod ledger;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use ledger::{FailureKind, Ledger, Tally, TestResult, is_critical};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::{ProbeError, Result};
use crate::scenario::RunState;

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            other => Err(ProbeError::Config(format!("unknown output format '{other}'"))),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Console => write!(f, "console"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for run reporters
pub trait Reporter {
    /// Render a finished run
    fn report(&self, report: &RunReport, verbose: bool) -> String;
}

/// Get a reporter for the given format
pub fn get_reporter(format: OutputFormat) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleReporter),
        OutputFormat::Json => Box::new(JsonReporter),
    }
}

/// Facts about a run that do not come from its results
#[derive(Debug, Clone, Default)]
pub struct RunMetadata {
    pub run_id: String,
    pub suite: String,
    pub api_url: String,
    pub test_users: Vec<String>,
    pub duration_ms: u64,
}

/// Header of a persisted report. Counts are derived from the results and
/// always agree with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tests_run: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    /// Percentage, 0 when nothing ran
    pub success_rate: f64,
    pub timestamp: DateTime<Utc>,
    pub state: RunState,
    pub suite: String,
    pub run_id: String,
    pub api_url: String,
    #[serde(default)]
    pub test_users: Vec<String>,
    #[serde(default)]
    pub critical_failures: Vec<String>,
    #[serde(default)]
    pub duration_ms: u64,
}

/// The persisted artifact of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub results: Vec<TestResult>,
}

impl RunReport {
    pub fn new(ledger: &Ledger, state: RunState, metadata: RunMetadata) -> Self {
        let tally = ledger.tally();
        Self {
            summary: RunSummary {
                tests_run: tally.tests_run,
                tests_passed: tally.tests_passed,
                tests_failed: tally.tests_failed,
                success_rate: tally.success_rate,
                timestamp: Utc::now(),
                state,
                suite: metadata.suite,
                run_id: metadata.run_id,
                api_url: metadata.api_url,
                test_users: metadata.test_users,
                critical_failures: ledger.critical_failures().map(|r| r.name.clone()).collect(),
                duration_ms: metadata.duration_ms,
            },
            results: ledger.results().to_vec(),
        }
    }

    /// True iff the run completed and every recorded result succeeded.
    /// Judged from the results themselves, never from stored counts.
    pub fn passed(&self) -> bool {
        self.summary.state.is_completed() && self.failures().next().is_none()
    }

    /// Process exit code for this run: 0 iff it passed
    pub fn exit_code(&self) -> u8 {
        if self.passed() { 0 } else { 1 }
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }

    /// Read a persisted report and check its counts against its results
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let report: RunReport = serde_json::from_str(&content)?;

        let summary = &report.summary;
        let tally = Tally::from_results(&report.results);
        if tally.tests_run != summary.tests_run
            || tally.tests_passed != summary.tests_passed
            || tally.tests_failed != summary.tests_failed
        {
            return Err(ProbeError::InvalidReport(format!(
                "summary claims {} run, {} passed, {} failed but results show {} run, {} passed, {} failed",
                summary.tests_run,
                summary.tests_passed,
                summary.tests_failed,
                tally.tests_run,
                tally.tests_passed,
                tally.tests_failed
            )));
        }

        let critical: Vec<&str> = report
            .results
            .iter()
            .filter(|r| r.is_critical_failure())
            .map(|r| r.name.as_str())
            .collect();
        if critical != summary.critical_failures {
            return Err(ProbeError::InvalidReport(format!(
                "summary lists critical failures {:?} but results show {:?}",
                summary.critical_failures, critical
            )));
        }
        Ok(report)
    }
}

/// Truncate to `limit` characters, marking the cut with `...`
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
