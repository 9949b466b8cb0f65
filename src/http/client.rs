// src/http/client.rs
// reqwest-backed dispatcher with bounded timeouts

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{Dispatcher, Outcome, RequestSpec};
use crate::error::{ProbeError, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on connection establishment
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatches requests against `<base>/<prefix>/<path>`.
///
/// One client is built per run and reused for every request, so connections
/// are pooled across steps.
pub struct HttpDispatcher {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl HttpDispatcher {
    /// Create a dispatcher rooted at `api_url`. A zero timeout is rejected:
    /// an unresponsive backend must never hang the run.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(ProbeError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a relative request path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {:?}", self.timeout)
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            format!("request failed: {err}")
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &RequestSpec, token: Option<&str>) -> Outcome {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, url = %url, auth = token.is_some(), "Dispatching");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                let message = self.describe(&err);
                warn!(url = %url, error = %message, "Transport failure");
                return Outcome::transport_failure(message, elapsed_ms(started));
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) => Outcome::from_response(status, &text, elapsed_ms(started)),
            Err(err) => {
                let message = format!("failed to read response body: {}", self.describe(&err));
                warn!(url = %url, status, error = %message, "Transport failure");
                Outcome::transport_failure(message, elapsed_ms(started))
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
