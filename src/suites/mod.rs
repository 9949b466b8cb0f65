// src/suites/mod.rs
// Built-in plans against the multi-tenant project service

pub mod isolation;
pub mod standard;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::actor::{ActorSlot, MissingPrerequisite, ResourceKind, Roster};
use crate::api::{self, CompileRequest};
use crate::error::ProbeError;
use crate::http::RequestSpec;
use crate::scenario::{Capture, Plan, Step};

/// Code snippet submitted to the compile endpoint
pub const COMPOSITION_CODE: &str =
    "const composition = { tracks: [], tempo: 120, timeSignature: '4/4', duration: 4 }; return composition;";

/// Code stored on project updates
pub const UPDATED_CODE: &str = "// Updated JMON code\nconst newComposition = { tracks: [{ name: 'Test Track' }], tempo: 140 };\nreturn newComposition;";

/// Which built-in plan to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Single actor, every endpoint once
    Standard,
    /// Two actors, cross-tenant isolation
    #[default]
    Isolation,
}

/// Knobs that change which steps a plan contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Delete created resources at the end of the run
    pub cleanup: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { cleanup: true }
    }
}

impl Suite {
    pub const ALL: [Suite; 2] = [Suite::Standard, Suite::Isolation];

    pub fn name(self) -> &'static str {
        match self {
            Suite::Standard => "standard",
            Suite::Isolation => "isolation",
        }
    }

    pub fn actors(self) -> &'static [ActorSlot] {
        match self {
            Suite::Standard => &[ActorSlot::Primary],
            Suite::Isolation => &ActorSlot::ALL,
        }
    }

    /// File the artifact is written to when no path is configured
    pub fn default_report_path(self) -> &'static str {
        match self {
            Suite::Standard => "backend_test_results.json",
            Suite::Isolation => "backend_multiuser_test_results.json",
        }
    }

    pub fn plan(self, options: &PlanOptions) -> Plan {
        match self {
            Suite::Standard => standard::plan(options),
            Suite::Isolation => isolation::plan(options),
        }
    }
}

impl FromStr for Suite {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "single" => Ok(Suite::Standard),
            "isolation" | "multiuser" | "multi-user" => Ok(Suite::Isolation),
            other => Err(ProbeError::Config(format!("unknown suite '{other}'"))),
        }
    }
}

impl Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Steps shared by both suites

fn registration(name: &str, slot: ActorSlot) -> Step {
    Step::new(name, move |r| Ok(api::register(&r.profile(slot)?.registration())))
        .on_behalf_of(slot)
        .capture(Capture::Session)
        .load_bearing()
}

/// Compile request tied to the actor's project when one exists
fn compile_for(
    slot: ActorSlot,
) -> impl Fn(&Roster) -> Result<RequestSpec, MissingPrerequisite> + Send + Sync + 'static {
    move |r: &Roster| {
        Ok(api::compile(&CompileRequest {
            code: COMPOSITION_CODE.to_string(),
            project_id: r.resource(slot, ResourceKind::Project).map(String::from),
        }))
    }
}

fn composition(tempo: u32, tracks: Value) -> Value {
    json!({
        "tracks": tracks,
        "tempo": tempo,
        "timeSignature": "4/4",
        "duration": 4
    })
}
