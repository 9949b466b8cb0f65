// src/scenario/runner.rs
// Sequential plan execution with abort propagation

use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::actor::{Roster, authenticated_call};
use crate::http::Dispatcher;
use crate::report::{FailureKind, Ledger, TestResult};

use super::step::{Auth, Step, evaluate};
use super::{Plan, RunState};

/// Final state of a run plus everything it produced
#[derive(Debug)]
pub struct RunOutcome {
    pub state: RunState,
    pub ledger: Ledger,
    pub roster: Roster,
    pub duration_ms: u64,
}

/// Executes a plan step by step against one dispatcher.
///
/// Steps run strictly in plan order; no step starts before the previous one
/// has produced its result. The run stays Pending through preliminary
/// scenarios and becomes Running when the first setup scenario (one holding a
/// load-bearing step) begins. A failing load-bearing step aborts the run and
/// no further steps are attempted.
pub struct ScenarioRunner<'a, D: Dispatcher + ?Sized> {
    dispatcher: &'a D,
    roster: Roster,
    ledger: Ledger,
    state: RunState,
}

impl<'a, D: Dispatcher + ?Sized> ScenarioRunner<'a, D> {
    pub fn new(dispatcher: &'a D, roster: Roster) -> Self {
        Self {
            dispatcher,
            roster,
            ledger: Ledger::new(),
            state: RunState::Pending,
        }
    }

    /// Run every step of `plan` and hand back the results
    pub async fn run(mut self, plan: &Plan) -> RunOutcome {
        let start = Instant::now();
        info!(plan = %plan.name, steps = plan.step_count(), "Starting run");

        'scenarios: for scenario in &plan.scenarios {
            info!("--- {} ---", scenario.name);
            if scenario.is_setup() {
                self.state.start();
            }

            for step in &scenario.steps {
                let result = self.run_step(&scenario.name, step).await;
                narrate(&result);

                let failed = !result.success;
                let reason = result.details.clone();
                self.ledger.record(result);

                if failed && step.load_bearing {
                    error!(step = %step.name, "Load-bearing step failed, aborting run");
                    self.state.abort(&step.name, reason);
                    break 'scenarios;
                }
            }
        }

        self.state.complete();

        let shared = self.roster.shared_resources();
        if !shared.is_empty() {
            warn!(ids = ?shared, "Service issued the same resource id to different actors");
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let tally = self.ledger.tally();
        info!(
            state = %self.state,
            passed = tally.tests_passed,
            run = tally.tests_run,
            duration_ms,
            "Run finished"
        );

        RunOutcome {
            state: self.state,
            ledger: self.ledger,
            roster: self.roster,
            duration_ms,
        }
    }

    async fn run_step(&mut self, scenario: &str, step: &Step) -> TestResult {
        let request = match step.prepare(&self.roster) {
            Ok(request) => request,
            Err(missing) => {
                return TestResult::failed(
                    &step.name,
                    scenario,
                    FailureKind::Prerequisite,
                    missing.to_string(),
                );
            }
        };

        debug!(step = %step.name, request = %request, "Dispatching");
        let outcome = match &step.auth {
            Auth::Actor(slot) => {
                match authenticated_call(self.dispatcher, self.roster.get(*slot), &request).await {
                    Ok(outcome) => outcome,
                    Err(missing) => {
                        return TestResult::failed(
                            &step.name,
                            scenario,
                            FailureKind::Prerequisite,
                            missing.to_string(),
                        );
                    }
                }
            }
            Auth::Anonymous => self.dispatcher.dispatch(&request, None).await,
            Auth::Token(token) => self.dispatcher.dispatch(&request, Some(token.as_str())).await,
        };
        debug!(
            step = %step.name,
            status = outcome.status,
            elapsed_ms = outcome.elapsed_ms,
            "Response received"
        );

        let violations = if outcome.transport_error.is_none() && step.expect.matches(outcome.status) {
            step.inspect(&request, &outcome, &mut self.roster)
        } else {
            Vec::new()
        };

        evaluate(&step.name, scenario, &step.expect, &outcome, &violations)
    }
}

fn narrate(result: &TestResult) {
    if result.success {
        info!("PASS {}", result.name);
        debug!(details = %result.details);
    } else {
        warn!("FAIL {} | {}", result.name, result.details);
    }
}
