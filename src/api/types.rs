// src/api/types.rs
// Request payloads and per-endpoint response shapes

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub jmon_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jmon_object: Option<Value>,
}

/// Partial project update; absent fields are left untouched by the service
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jmon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jmon_object: Option<Value>,
}

/// Compile request. `project_id` is sent as `null` when no project exists.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompileRequest {
    pub code: String,
    pub project_id: Option<String>,
}

// ============================================================================
// Response shapes
// ============================================================================

/// Identifiers are opaque to the harness; the service may emit strings or numbers.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Body of `auth/register` and `auth/login`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// Body of `auth/me`, also embedded in [`AuthResponse`]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A folder or project as returned by create/get
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResourceRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `analytics/stats`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UsageStats {
    pub total_projects: u64,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Response schema an endpoint promises on success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Session,
    User,
    Resource,
    Listing,
    Stats,
    Activity,
    /// No promise; the body is never decoded
    Any,
}

impl Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Schema::Session => "session",
            Schema::User => "user",
            Schema::Resource => "resource",
            Schema::Listing => "listing",
            Schema::Stats => "usage stats",
            Schema::Activity => "activity",
            Schema::Any => "untyped",
        };
        write!(f, "{label}")
    }
}

/// A decoded response body, one variant per schema
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Session(AuthResponse),
    User(UserRecord),
    Resource(ResourceRecord),
    Listing(Vec<ResourceRecord>),
    Stats(UsageStats),
    Activity(Vec<Value>),
    Untyped(Value),
}

impl ApiResponse {
    /// Decode `body` according to `schema`
    pub fn decode(schema: Schema, body: &Value) -> Result<Self, String> {
        fn typed<T: for<'de> Deserialize<'de>>(schema: Schema, body: &Value) -> Result<T, String> {
            serde_json::from_value(body.clone())
                .map_err(|e| format!("response is not a valid {schema} body: {e}"))
        }

        Ok(match schema {
            Schema::Session => ApiResponse::Session(typed(schema, body)?),
            Schema::User => ApiResponse::User(typed(schema, body)?),
            Schema::Resource => ApiResponse::Resource(typed(schema, body)?),
            Schema::Listing => ApiResponse::Listing(typed(schema, body)?),
            Schema::Stats => ApiResponse::Stats(typed(schema, body)?),
            Schema::Activity => ApiResponse::Activity(typed(schema, body)?),
            Schema::Any => ApiResponse::Untyped(body.clone()),
        })
    }

    /// The `id` carried by a single-record response
    pub fn id(&self) -> Option<&str> {
        match self {
            ApiResponse::User(user) => Some(&user.id),
            ApiResponse::Resource(resource) => Some(&resource.id),
            ApiResponse::Session(session) => session.user.as_ref().map(|u| u.id.as_str()),
            ApiResponse::Untyped(value) => value.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Identifiers of every record in a listing
    pub fn listed_ids(&self) -> Option<Vec<&str>> {
        match self {
            ApiResponse::Listing(records) => Some(records.iter().map(|r| r.id.as_str()).collect()),
            _ => None,
        }
    }
}
