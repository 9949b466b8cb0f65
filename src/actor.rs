// src/actor.rs
// Simulated tenants: credentials, identity, and the resources each one owns

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{self, ApiResponse, AuthResponse, LoginRequest, RegisterRequest, Schema};
use crate::http::{Dispatcher, Outcome, RequestSpec};

/// Position of an actor in a run. Isolation suites use both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorSlot {
    Primary,
    Secondary,
}

impl ActorSlot {
    pub const ALL: [ActorSlot; 2] = [ActorSlot::Primary, ActorSlot::Secondary];

    fn ordinal(self) -> u8 {
        match self {
            ActorSlot::Primary => 1,
            ActorSlot::Secondary => 2,
        }
    }
}

impl Display for ActorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.ordinal())
    }
}

/// Kinds of resources an actor can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Folder,
    Project,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Folder => write!(f, "folder"),
            ResourceKind::Project => write!(f, "project"),
        }
    }
}

/// Identity fields sent at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Profile {
    /// Build a profile that is unique to this run via `run_tag`
    pub fn generate(slot: ActorSlot, run_tag: &str, username_prefix: &str, password: &str) -> Self {
        let n = slot.ordinal();
        let full_name = match slot {
            ActorSlot::Primary => "Test User One",
            ActorSlot::Secondary => "Test User Two",
        };
        Self {
            username: format!("{username_prefix}{n}_{run_tag}"),
            email: format!("test{n}_{run_tag}@example.com"),
            password: password.to_string(),
            full_name: full_name.to_string(),
        }
    }

    pub fn registration(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
        }
    }

    pub fn login(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Why a step could not be attempted. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingPrerequisite {
    #[error("missing prerequisite: authenticated request has no actor")]
    NoActor,

    #[error("missing prerequisite: {0} is not part of this run")]
    UnknownActor(ActorSlot),

    #[error("missing prerequisite: {0} holds no credential")]
    Credential(ActorSlot),

    #[error("missing prerequisite: {0} has no identifier")]
    Identifier(ActorSlot),

    #[error("missing prerequisite resource: no {kind} id captured for {slot}")]
    Resource { slot: ActorSlot, kind: ResourceKind },
}

/// Failure to establish a session for an actor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("status {status} but no access_token in response")]
    MissingToken { status: u16 },

    #[error("malformed session response: {0}")]
    Malformed(String),
}

/// One authenticated principal
#[derive(Debug, Clone)]
pub struct Actor {
    pub slot: ActorSlot,
    pub profile: Profile,
    identifier: Option<String>,
    credential: Option<String>,
    owned: BTreeMap<ResourceKind, String>,
}

impl Actor {
    pub fn new(slot: ActorSlot, profile: Profile) -> Self {
        Self {
            slot,
            profile,
            identifier: None,
            credential: None,
            owned: BTreeMap::new(),
        }
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn resource(&self, kind: ResourceKind) -> Option<&str> {
        self.owned.get(&kind).map(String::as_str)
    }

    /// Take credential and identifier from a session response.
    ///
    /// A response without `access_token` is an error even if the status was 200.
    pub fn adopt_session(&mut self, status: u16, session: &AuthResponse) -> Result<(), AuthError> {
        let token = session
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken { status })?;

        self.credential = Some(token.to_string());
        if let Some(user) = &session.user {
            self.identifier = Some(user.id.clone());
        }
        debug!(actor = %self.slot, identifier = ?self.identifier, "Session adopted");
        Ok(())
    }

    /// Adopt the session carried by a decoded registration or login body.
    /// Every registration path goes through here.
    pub fn adopt_response(&mut self, status: u16, response: Option<&ApiResponse>) -> Result<(), AuthError> {
        match response {
            Some(ApiResponse::Session(session)) => self.adopt_session(status, session),
            Some(other) => Err(AuthError::Malformed(format!("unexpected shape {other:?}"))),
            None => Err(AuthError::Malformed("response carried no session".to_string())),
        }
    }

    /// Record a resource created under this actor's credential
    pub fn record_resource(&mut self, kind: ResourceKind, id: impl Into<String>) {
        let id = id.into();
        debug!(actor = %self.slot, %kind, id = %id, "Captured resource");
        self.owned.insert(kind, id);
    }

    /// Drop a resource after it was deleted
    pub fn forget_resource(&mut self, kind: ResourceKind) -> Option<String> {
        self.owned.remove(&kind)
    }
}

/// The run's actors, and through them the captured-ID table
#[derive(Debug, Clone, Default)]
pub struct Roster {
    actors: BTreeMap<ActorSlot, Actor>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create unregistered actors for the given slots
    pub fn for_run(slots: &[ActorSlot], run_tag: &str, username_prefix: &str, password: &str) -> Self {
        let mut roster = Self::new();
        for &slot in slots {
            roster.insert(Actor::new(
                slot,
                Profile::generate(slot, run_tag, username_prefix, password),
            ));
        }
        roster
    }

    pub fn insert(&mut self, actor: Actor) {
        self.actors.insert(actor.slot, actor);
    }

    pub fn get(&self, slot: ActorSlot) -> Option<&Actor> {
        self.actors.get(&slot)
    }

    pub fn get_mut(&mut self, slot: ActorSlot) -> Option<&mut Actor> {
        self.actors.get_mut(&slot)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn actor(&self, slot: ActorSlot) -> Result<&Actor, MissingPrerequisite> {
        self.get(slot).ok_or(MissingPrerequisite::UnknownActor(slot))
    }

    /// Captured id of `kind` owned by `slot`, if any
    pub fn resource(&self, slot: ActorSlot, kind: ResourceKind) -> Option<&str> {
        self.get(slot).and_then(|a| a.resource(kind))
    }

    /// Captured id of `kind` owned by `slot`, or the prerequisite it lacks
    pub fn require(&self, slot: ActorSlot, kind: ResourceKind) -> Result<&str, MissingPrerequisite> {
        self.resource(slot, kind)
            .ok_or(MissingPrerequisite::Resource { slot, kind })
    }

    pub fn require_identifier(&self, slot: ActorSlot) -> Result<&str, MissingPrerequisite> {
        self.actor(slot)?
            .identifier()
            .ok_or(MissingPrerequisite::Identifier(slot))
    }

    pub fn profile(&self, slot: ActorSlot) -> Result<&Profile, MissingPrerequisite> {
        Ok(&self.actor(slot)?.profile)
    }

    /// Resource ids recorded by more than one actor. Empty for a healthy run.
    pub fn shared_resources(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, ActorSlot> = BTreeMap::new();
        let mut shared = Vec::new();
        for actor in self.actors.values() {
            for id in actor.owned.values() {
                match seen.get(id.as_str()) {
                    Some(&owner) if owner != actor.slot => shared.push(id.clone()),
                    _ => {
                        seen.insert(id.as_str(), actor.slot);
                    }
                }
            }
        }
        shared
    }
}

/// Register `profile` and return an actor holding the new session.
pub async fn register<D>(dispatcher: &D, slot: ActorSlot, profile: Profile) -> Result<Actor, AuthError>
where
    D: Dispatcher + ?Sized,
{
    let request = api::register(&profile.registration());
    let outcome = dispatcher.dispatch(&request, None).await;

    if let Some(err) = outcome.transport_error {
        return Err(AuthError::Transport(err));
    }
    if outcome.status != 200 {
        return Err(AuthError::Rejected {
            status: outcome.status,
            body: outcome.render_body(),
        });
    }

    let decoded = ApiResponse::decode(Schema::Session, &outcome.body).map_err(AuthError::Malformed)?;

    let mut actor = Actor::new(slot, profile);
    actor.adopt_response(outcome.status, Some(&decoded))?;
    info!(actor = %slot, username = %actor.profile.username, "Registered");
    Ok(actor)
}

/// Dispatch `request` with the actor's credential attached.
///
/// Fails fast, without touching the network, when the request requires auth
/// but there is no actor or the actor holds no credential.
pub async fn authenticated_call<D>(
    dispatcher: &D,
    actor: Option<&Actor>,
    request: &RequestSpec,
) -> Result<Outcome, MissingPrerequisite>
where
    D: Dispatcher + ?Sized,
{
    let token = match actor {
        Some(actor) => actor.credential(),
        None => None,
    };

    if request.requires_auth && token.is_none() {
        return Err(match actor {
            Some(actor) => MissingPrerequisite::Credential(actor.slot),
            None => MissingPrerequisite::NoActor,
        });
    }

    Ok(dispatcher.dispatch(request, token).await)
}
