// src/scenario/step.rs
// One request/expectation pair and the rules for judging its outcome

use serde_json::Value;
use std::fmt::{self, Display};

use crate::actor::{ActorSlot, MissingPrerequisite, ResourceKind, Roster};
use crate::api::ApiResponse;
use crate::http::{Outcome, RequestSpec};
use crate::report::{FailureKind, TestResult, truncate};

/// Maximum characters of response body quoted in a result's details
pub const DETAIL_BODY_LIMIT: usize = 300;

type BuildRequest =
    Box<dyn Fn(&Roster) -> Result<RequestSpec, MissingPrerequisite> + Send + Sync>;

/// Credential attached to a step's request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Deliberately no credential
    Anonymous,
    /// The named actor's credential
    Actor(ActorSlot),
    /// A fixed token, typically a bogus one
    Token(String),
}

/// Acceptable status codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expect {
    statuses: Vec<u16>,
}

impl Expect {
    pub fn status(status: u16) -> Self {
        Self {
            statuses: vec![status],
        }
    }

    pub fn any_of(statuses: &[u16]) -> Self {
        Self {
            statuses: statuses.to_vec(),
        }
    }

    pub fn matches(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }

    pub fn statuses(&self) -> &[u16] {
        &self.statuses
    }
}

impl Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.statuses.iter().map(u16::to_string).collect();
        write!(f, "{}", rendered.join(" or "))
    }
}

/// Assertion on the body of a response whose status already matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Body identifies the given actor
    IdentifiesActor(ActorSlot),
    /// Body is the resource of `kind` owned by the actor
    ReturnsResource(ActorSlot, ResourceKind),
    /// Listing contains the actor's resource
    ListIncludes(ActorSlot, ResourceKind),
    /// Listing does not contain the actor's resource
    ListExcludes(ActorSlot, ResourceKind),
    /// Body has a top-level field
    HasField(&'static str),
}

impl Check {
    /// Actor the check refers to, if any
    pub fn slot(&self) -> Option<ActorSlot> {
        match self {
            Check::IdentifiesActor(slot)
            | Check::ReturnsResource(slot, _)
            | Check::ListIncludes(slot, _)
            | Check::ListExcludes(slot, _) => Some(*slot),
            Check::HasField(_) => None,
        }
    }

    fn needs_decode(&self) -> bool {
        !matches!(self, Check::HasField(_))
    }

    /// Captured values the check compares against
    fn prerequisite(&self, roster: &Roster) -> Result<(), MissingPrerequisite> {
        match self {
            Check::IdentifiesActor(slot) => roster.require_identifier(*slot).map(|_| ()),
            Check::ReturnsResource(slot, kind)
            | Check::ListIncludes(slot, kind)
            | Check::ListExcludes(slot, kind) => roster.require(*slot, *kind).map(|_| ()),
            Check::HasField(_) => Ok(()),
        }
    }

    fn verify(
        &self,
        roster: &Roster,
        response: Option<&ApiResponse>,
        body: &Value,
    ) -> Result<(), String> {
        match self {
            Check::HasField(field) => body
                .get(*field)
                .map(|_| ())
                .ok_or_else(|| format!("response lacks field '{field}'")),
            Check::IdentifiesActor(slot) => {
                let expected = roster.require_identifier(*slot).map_err(|e| e.to_string())?;
                match response.and_then(ApiResponse::id) {
                    Some(id) if id == expected => Ok(()),
                    got => Err(format!(
                        "expected identity {expected} of {slot}, got {}",
                        got.unwrap_or("none")
                    )),
                }
            }
            Check::ReturnsResource(slot, kind) => {
                let expected = roster.require(*slot, *kind).map_err(|e| e.to_string())?;
                match response.and_then(ApiResponse::id) {
                    Some(id) if id == expected => Ok(()),
                    got => Err(format!(
                        "expected {kind} {expected} of {slot}, got {}",
                        got.unwrap_or("none")
                    )),
                }
            }
            Check::ListIncludes(slot, kind) => {
                let expected = roster.require(*slot, *kind).map_err(|e| e.to_string())?;
                let ids = listing(response)?;
                if ids.contains(&expected) {
                    Ok(())
                } else {
                    Err(format!("listing is missing {kind} {expected} of {slot}"))
                }
            }
            Check::ListExcludes(slot, kind) => {
                let forbidden = roster.require(*slot, *kind).map_err(|e| e.to_string())?;
                let ids = listing(response)?;
                if ids.contains(&forbidden) {
                    Err(format!("listing exposes {kind} {forbidden} owned by {slot}"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn listing(response: Option<&ApiResponse>) -> Result<Vec<&str>, String> {
    response
        .and_then(ApiResponse::listed_ids)
        .ok_or_else(|| "response is not a listing".to_string())
}

/// What to take from a successful response, always into the step's actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Credential and identifier from a session body
    Session,
    /// Id of a newly created resource
    Resource(ResourceKind),
    /// Forget a resource the step deleted
    Release(ResourceKind),
}

/// A single unit of a scenario: one request, one expectation, one result
pub struct Step {
    pub name: String,
    /// Actor the step acts for; captures land here
    pub actor: Option<ActorSlot>,
    pub auth: Auth,
    pub expect: Expect,
    pub checks: Vec<Check>,
    pub capture: Option<Capture>,
    /// Failure of this step aborts the whole run
    pub load_bearing: bool,
    build: BuildRequest,
}

impl Step {
    /// New anonymous step expecting 200. The request is built lazily from the
    /// roster so it can reference ids captured by earlier steps.
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Roster) -> Result<RequestSpec, MissingPrerequisite> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            actor: None,
            auth: Auth::Anonymous,
            expect: Expect::status(200),
            checks: Vec::new(),
            capture: None,
            load_bearing: false,
            build: Box::new(build),
        }
    }

    /// Step with a request that does not depend on earlier captures
    pub fn fixed(name: impl Into<String>, request: RequestSpec) -> Self {
        Self::new(name, move |_| Ok(request.clone()))
    }

    /// Act as `slot` using its credential
    pub fn by(mut self, slot: ActorSlot) -> Self {
        self.actor = Some(slot);
        self.auth = Auth::Actor(slot);
        self
    }

    /// Act for `slot` without changing which credential is sent
    pub fn on_behalf_of(mut self, slot: ActorSlot) -> Self {
        self.actor = Some(slot);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Token(token.into());
        self
    }

    pub fn expect(mut self, status: u16) -> Self {
        self.expect = Expect::status(status);
        self
    }

    pub fn expect_any(mut self, statuses: &[u16]) -> Self {
        self.expect = Expect::any_of(statuses);
        self
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn load_bearing(mut self) -> Self {
        self.load_bearing = true;
        self
    }

    /// Verify prerequisites and build the request. Nothing is sent on error.
    pub fn prepare(&self, roster: &Roster) -> Result<RequestSpec, MissingPrerequisite> {
        if let Some(slot) = self.actor {
            roster.actor(slot)?;
        }
        for check in &self.checks {
            check.prerequisite(roster)?;
        }
        (self.build)(roster)
    }

    /// Run checks and captures against a response whose status matched.
    /// Returns every violated expectation.
    pub fn inspect(&self, request: &RequestSpec, outcome: &Outcome, roster: &mut Roster) -> Vec<String> {
        let needs_decode = self.checks.iter().any(Check::needs_decode)
            || matches!(self.capture, Some(Capture::Session | Capture::Resource(_)));

        let decoded = if needs_decode {
            match ApiResponse::decode(request.schema, &outcome.body) {
                Ok(decoded) => Some(decoded),
                Err(e) => return vec![e],
            }
        } else {
            None
        };

        let mut violations: Vec<String> = self
            .checks
            .iter()
            .filter_map(|check| check.verify(roster, decoded.as_ref(), &outcome.body).err())
            .collect();

        if violations.is_empty() {
            if let Some(capture) = self.capture {
                if let Err(e) = self.apply_capture(capture, outcome.status, decoded.as_ref(), roster) {
                    violations.push(e);
                }
            }
        }
        violations
    }

    fn apply_capture(
        &self,
        capture: Capture,
        status: u16,
        decoded: Option<&ApiResponse>,
        roster: &mut Roster,
    ) -> Result<(), String> {
        let slot = self
            .actor
            .ok_or_else(|| MissingPrerequisite::NoActor.to_string())?;
        let actor = roster
            .get_mut(slot)
            .ok_or_else(|| MissingPrerequisite::UnknownActor(slot).to_string())?;

        match capture {
            Capture::Session => actor
                .adopt_response(status, decoded)
                .map_err(|e| e.to_string()),
            Capture::Resource(kind) => {
                let id = decoded
                    .and_then(ApiResponse::id)
                    .ok_or_else(|| format!("response carried no {kind} id"))?;
                actor.record_resource(kind, id);
                Ok(())
            }
            Capture::Release(kind) => {
                actor.forget_resource(kind);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("actor", &self.actor)
            .field("auth", &self.auth)
            .field("expect", &self.expect)
            .field("checks", &self.checks)
            .field("capture", &self.capture)
            .field("load_bearing", &self.load_bearing)
            .finish_non_exhaustive()
    }
}

/// Judge an outcome. Success iff a response arrived, its status is
/// expected, and no body check was violated.
pub fn evaluate(
    name: &str,
    scenario: &str,
    expect: &Expect,
    outcome: &Outcome,
    violations: &[String],
) -> TestResult {
    let body = truncate(&outcome.render_body(), DETAIL_BODY_LIMIT);

    if let Some(err) = &outcome.transport_error {
        return TestResult::failed(
            name,
            scenario,
            FailureKind::Transport,
            format!("Expected {expect}, got 0 (transport failure: {err}). Response: {body}"),
        );
    }

    if !expect.matches(outcome.status) {
        return TestResult::failed(
            name,
            scenario,
            FailureKind::Contract,
            format!("Expected {expect}, got {}. Response: {body}", outcome.status),
        );
    }

    if !violations.is_empty() {
        return TestResult::failed(
            name,
            scenario,
            FailureKind::Contract,
            format!(
                "Status {} as expected, but {}. Response: {body}",
                outcome.status,
                violations.join("; ")
            ),
        );
    }

    TestResult::passed(
        name,
        scenario,
        format!("Status: {} (expected {expect}). Response: {body}", outcome.status),
    )
}
