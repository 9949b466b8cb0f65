// src/error.rs
// Error types for harness-level faults (never for test outcomes)

use thiserror::Error;

/// Errors raised by the harness itself: bad configuration, malformed plans,
/// unreadable artifacts. Failures of the service under test are recorded in
/// the ledger instead and never surface here.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("invalid report: {0}")]
    InvalidReport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience type alias for Result using ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;
