// src/report/console.rs
// Human-readable run summary

use super::{RunReport, Reporter, truncate};
use crate::scenario::RunState;

const RULE: &str = "================================================================================";

/// Characters of failure details shown per failed test
const FAILURE_DETAIL_LIMIT: usize = 150;

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, report: &RunReport, verbose: bool) -> String {
        let summary = &report.summary;
        let mut out = String::new();

        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("{} TEST SUMMARY\n", summary.suite.to_uppercase()));
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("Run:      {}\n", summary.run_id));
        out.push_str(&format!("API:      {}\n", summary.api_url));
        if !summary.test_users.is_empty() {
            out.push_str(&format!("Users:    {}\n", summary.test_users.join(", ")));
        }
        out.push_str(&format!("Total:    {}\n", summary.tests_run));
        out.push_str(&format!(
            "Passed:   {} ({:.1}%)\n",
            summary.tests_passed, summary.success_rate
        ));
        out.push_str(&format!("Failed:   {}\n", summary.tests_failed));
        out.push_str(&format!("Duration: {}ms\n", summary.duration_ms));

        if let RunState::Aborted { step, reason } = &summary.state {
            out.push_str(&format!(
                "Aborted:  at '{}': {}\n",
                step,
                truncate(reason, FAILURE_DETAIL_LIMIT)
            ));
        }
        out.push_str(RULE);
        out.push('\n');

        let failures: Vec<_> = report.failures().collect();
        if !failures.is_empty() {
            out.push_str(&format!("\nFAILED TESTS ({}):\n", failures.len()));
            for result in &failures {
                out.push_str(&format!(
                    "  - {}: {}\n",
                    result.name,
                    truncate(&result.details, FAILURE_DETAIL_LIMIT)
                ));
            }
        }

        if !summary.critical_failures.is_empty() {
            out.push_str("\nCRITICAL FAILURES:\n");
            for name in &summary.critical_failures {
                out.push_str(&format!("  - {name}\n"));
            }
        }

        let passed: Vec<_> = report.results.iter().filter(|r| r.success).collect();
        if !passed.is_empty() {
            out.push_str(&format!("\nPASSED TESTS ({}):\n", passed.len()));
            for result in passed {
                if verbose {
                    out.push_str(&format!(
                        "  - {}: {}\n",
                        result.name,
                        truncate(&result.details, FAILURE_DETAIL_LIMIT)
                    ));
                } else {
                    out.push_str(&format!("  - {}\n", result.name));
                }
            }
        }

        out.push('\n');
        let verdict = match &summary.state {
            RunState::Aborted { .. } => "ABORTED",
            _ if report.passed() => "PASSED",
            _ => "FAILED",
        };
        out.push_str(&format!("RESULT: {verdict}\n"));
        out
    }
}
