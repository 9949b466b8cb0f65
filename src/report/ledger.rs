// src/report/ledger.rs
// Append-only record of test results, the run's source of truth

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names containing any of these (case-insensitive) are critical failures
pub const CRITICAL_KEYWORDS: [&str; 5] = ["auth", "login", "register", "registration", "health"];

/// Why a test failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response was obtained (status 0)
    Transport,
    /// A response arrived but its status or shape was wrong
    Contract,
    /// An earlier step did not produce what this one needs; nothing was sent
    Prerequisite,
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(rename = "test_name")]
    pub name: String,
    #[serde(default)]
    pub scenario: String,
    pub success: bool,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    pub fn passed(name: &str, scenario: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            scenario: scenario.to_string(),
            success: true,
            details: details.into(),
            failure: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(name: &str, scenario: &str, kind: FailureKind, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            scenario: scenario.to_string(),
            success: false,
            details: details.into(),
            failure: Some(kind),
            timestamp: Utc::now(),
        }
    }

    /// A failed result whose name marks it as auth/health related
    pub fn is_critical_failure(&self) -> bool {
        !self.success && is_critical(&self.name)
    }
}

/// Presentation-only classification; never affects counts
pub fn is_critical(name: &str) -> bool {
    let lowered = name.to_lowercase();
    CRITICAL_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Counts derived from a sequence of results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub tests_run: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    /// Percentage of passed tests, 0 when nothing ran
    pub success_rate: f64,
}

impl Tally {
    pub fn from_results(results: &[TestResult]) -> Self {
        let tests_run = results.len();
        let tests_passed = results.iter().filter(|r| r.success).count();
        let success_rate = if tests_run > 0 {
            tests_passed as f64 / tests_run as f64 * 100.0
        } else {
            0.0
        };
        Self {
            tests_run,
            tests_passed,
            tests_failed: tests_run - tests_passed,
            success_rate,
        }
    }
}

/// Ordered results of a run. Insertion order is execution order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    results: Vec<TestResult>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Current counts, recomputed on every call
    pub fn tally(&self) -> Tally {
        Tally::from_results(&self.results)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn critical_failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.is_critical_failure())
    }

    pub fn get(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.name == name)
    }
}
