// src/cli/inspect.rs
// CLI handlers that never touch the network: `list` and `report`

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::report::{OutputFormat, RunReport, get_reporter};
use crate::scenario::{Auth, Plan};
use crate::suites::{PlanOptions, Suite};

pub fn list_plan(suite: Suite, cleanup: bool) -> Result<ExitCode> {
    let plan = suite.plan(&PlanOptions { cleanup });
    plan.validate()?;
    print!("{}", render_plan(&plan));
    Ok(ExitCode::SUCCESS)
}

fn render_plan(plan: &Plan) -> String {
    let mut out = format!(
        "Suite: {} ({} actor(s), {} steps)\n",
        plan.name,
        plan.actors.len(),
        plan.step_count()
    );

    let mut index = 0;
    for scenario in &plan.scenarios {
        out.push_str(&format!("\n{}\n", scenario.name));
        for step in &scenario.steps {
            index += 1;
            let auth = match &step.auth {
                Auth::Anonymous => "anonymous".to_string(),
                Auth::Actor(slot) => format!("as {slot}"),
                Auth::Token(_) => "bogus token".to_string(),
            };
            out.push_str(&format!(
                "  {index:>2}. {} ({auth}, expects {}){}\n",
                step.name,
                step.expect,
                if step.load_bearing { " [load-bearing]" } else { "" }
            ));
        }
    }
    out
}

/// Print a persisted report and exit with the code it implies
pub fn show_report(path: &Path, format: OutputFormat, verbose: bool) -> Result<ExitCode> {
    let report = RunReport::load(path)
        .with_context(|| format!("Failed to read results from {}", path.display()))?;
    print!("{}", get_reporter(format).report(&report, verbose));
    Ok(ExitCode::from(report.exit_code()))
}
