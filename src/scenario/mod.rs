// src/scenario/mod.rs
// Scenario plans: ordered steps grouped by the behavior they exercise

pub mod runner;
pub mod state;
pub mod step;

pub use runner::{RunOutcome, ScenarioRunner};
pub use state::RunState;
pub use step::{Auth, Capture, Check, Expect, Step, evaluate};

use std::collections::HashSet;

use crate::actor::ActorSlot;
use crate::error::{ProbeError, Result};

/// A named group of steps
#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// A scenario holding a load-bearing step sets up the run
    pub fn is_setup(&self) -> bool {
        self.steps.iter().any(|s| s.load_bearing)
    }
}

/// Everything a run executes, in order
#[derive(Debug)]
pub struct Plan {
    pub name: String,
    /// Actors the plan acts as; each needs a roster entry
    pub actors: Vec<ActorSlot>,
    pub scenarios: Vec<Scenario>,
}

impl Plan {
    pub fn new(name: impl Into<String>, actors: &[ActorSlot]) -> Self {
        Self {
            name: name.into(),
            actors: actors.to_vec(),
            scenarios: Vec::new(),
        }
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.scenarios.iter().flat_map(|s| s.steps.iter())
    }

    pub fn step_count(&self) -> usize {
        self.steps().count()
    }

    /// Reject plans the runner could not execute faithfully: duplicate step
    /// names, references to actors outside the plan, and captures with no
    /// actor to land in.
    pub fn validate(&self) -> Result<()> {
        if self.step_count() == 0 {
            return Err(ProbeError::InvalidPlan(format!("plan '{}' has no steps", self.name)));
        }

        let mut names = HashSet::new();
        for step in self.steps() {
            if !names.insert(step.name.as_str()) {
                return Err(ProbeError::InvalidPlan(format!(
                    "duplicate step name '{}'",
                    step.name
                )));
            }

            let auth_slot = match &step.auth {
                Auth::Actor(slot) => Some(*slot),
                _ => None,
            };
            let referenced = step
                .actor
                .into_iter()
                .chain(auth_slot)
                .chain(step.checks.iter().filter_map(Check::slot));
            for slot in referenced {
                if !self.actors.contains(&slot) {
                    return Err(ProbeError::InvalidPlan(format!(
                        "step '{}' refers to {slot}, which is not in the plan",
                        step.name
                    )));
                }
            }

            match step.capture {
                Some(Capture::Session) if step.actor.is_none() => {
                    return Err(ProbeError::InvalidPlan(format!(
                        "step '{}' captures a session but acts for no actor",
                        step.name
                    )));
                }
                Some(Capture::Resource(kind) | Capture::Release(kind))
                    if step.actor.is_none() || auth_slot != step.actor =>
                {
                    return Err(ProbeError::InvalidPlan(format!(
                        "step '{}' captures a {kind} but does not act under its actor's credential",
                        step.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
