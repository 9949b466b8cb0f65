// src/http/mod.rs
// Request dispatch abstraction: request specs, normalized outcomes, dispatcher seam

pub mod client;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display};

use crate::api::Schema;

pub use client::HttpDispatcher;

/// HTTP methods the harness issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        write!(f, "{label}")
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One request against the service, relative to the API root.
///
/// Built by the endpoint constructors in [`crate::api`] and never mutated
/// after a step has produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    /// Relative path, may carry a query string (`projects?folder_id=`)
    pub path: String,
    pub body: Option<Value>,
    pub requires_auth: bool,
    /// Shape of a successful response from this endpoint
    pub schema: Schema,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            requires_auth: false,
            schema: Schema::Any,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        // Derived Serialize impls over string-keyed structs cannot fail here.
        self.body = Some(serde_json::to_value(body).unwrap_or(Value::Null));
        self
    }

    /// Mark the endpoint as protected
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn returning(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }
}

impl Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path.trim_start_matches('/'))
    }
}

/// Normalized result of one dispatched request.
///
/// `status == 0` means no HTTP response was obtained; `transport_error`
/// then says why. Any obtained response keeps its real status, whatever it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    /// Parsed JSON body, or an empty object when the body was empty or not JSON
    pub body: Value,
    /// Original text of a body that failed to parse, kept for diagnostics only
    pub raw_text: Option<String>,
    pub transport_error: Option<String>,
    pub elapsed_ms: u64,
}

impl Outcome {
    /// Build an outcome from a received response
    pub fn from_response(status: u16, text: &str, elapsed_ms: u64) -> Self {
        let (body, raw_text) = parse_body(text);
        Self {
            status,
            body,
            raw_text,
            transport_error: None,
            elapsed_ms,
        }
    }

    /// Build an outcome for a request that never got a response
    pub fn transport_failure(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            status: 0,
            body: empty_object(),
            raw_text: None,
            transport_error: Some(message.into()),
            elapsed_ms,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    /// Compact rendering of the body for diagnostics
    pub fn render_body(&self) -> String {
        match (&self.raw_text, &self.transport_error) {
            (_, Some(err)) => format!("{{\"error\":{}}}", Value::String(err.clone())),
            (Some(raw), None) => raw.clone(),
            (None, None) => self.body.to_string(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Parse a response body, falling back to an empty object.
///
/// Empty bodies are normal (DELETE), so neither case is an error.
fn parse_body(text: &str) -> (Value, Option<String>) {
    if text.trim().is_empty() {
        return (empty_object(), None);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => (value, None),
        Err(_) => (empty_object(), Some(text.to_string())),
    }
}

/// The seam between the runner and the network.
///
/// Implementations never fail: every fault is folded into the returned
/// [`Outcome`].
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &RequestSpec, token: Option<&str>) -> Outcome;
}
