// src/report/json.rs
// Machine-readable run report, same shape as the persisted artifact

use super::{Reporter, RunReport};

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, report: &RunReport, _verbose: bool) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}
