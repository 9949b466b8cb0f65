// src/testing.rs
// Scripted in-memory dispatcher for unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::http::{Dispatcher, Method, Outcome, RequestSpec};

/// A request as the dispatcher saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

/// Replays canned outcomes keyed by `"METHOD path"` or by bare path.
///
/// Queued outcomes are consumed in order; the last one for a key repeats.
/// Unscripted requests get a 404.
#[derive(Default)]
pub struct ScriptedDispatcher {
    routes: Mutex<HashMap<String, VecDeque<Outcome>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for any method on `path`
    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.push(path.to_string(), Outcome::from_response(status, &body.to_string(), 1));
    }

    /// Script a response for one method on `path`
    pub fn respond_to(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            format!("{method} {path}"),
            Outcome::from_response(status, &body.to_string(), 1),
        );
    }

    /// Script a transport failure for any method on `path`
    pub fn fail_transport(&self, path: &str, message: &str) {
        self.push(path.to_string(), Outcome::transport_failure(message, 1));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    fn push(&self, key: String, outcome: Outcome) {
        self.routes
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(outcome);
    }

    fn next(&self, key: &str) -> Option<Outcome> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn dispatch(&self, request: &RequestSpec, token: Option<&str>) -> Outcome {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path.clone(),
            body: request.body.clone(),
            token: token.map(String::from),
        });

        self.next(&format!("{} {}", request.method, request.path))
            .or_else(|| self.next(&request.path))
            .unwrap_or_else(|| Outcome::from_response(404, r#"{"detail":"Not Found"}"#, 1))
    }
}
