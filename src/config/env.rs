// src/config/env.rs
// Environment overrides - single source of truth for PROBE_* variables

use std::path::PathBuf;
use tracing::debug;

use crate::error::{ProbeError, Result};
use crate::suites::Suite;

pub const BASE_URL: &str = "PROBE_BASE_URL";
pub const API_PREFIX: &str = "PROBE_API_PREFIX";
pub const TIMEOUT_SECS: &str = "PROBE_TIMEOUT_SECS";
pub const REPORT_PATH: &str = "PROBE_REPORT_PATH";
pub const SUITE: &str = "PROBE_SUITE";
pub const PASSWORD: &str = "PROBE_PASSWORD";
pub const CLEANUP: &str = "PROBE_CLEANUP";

/// Values taken from the environment; `None` means unset or blank
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub report_path: Option<PathBuf>,
    pub suite: Option<Suite>,
    pub password: Option<String>,
    pub cleanup: Option<bool>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`. Set but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout_secs = match read(TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ProbeError::Config(format!("{TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?),
            None => None,
        };

        let suite = read(SUITE).map(|raw| raw.parse::<Suite>()).transpose()?;

        let cleanup = match read(CLEANUP) {
            Some(raw) => Some(parse_bool(&raw).ok_or_else(|| {
                ProbeError::Config(format!("{CLEANUP} must be a boolean, got '{raw}'"))
            })?),
            None => None,
        };

        let overrides = Self {
            base_url: read(BASE_URL),
            api_prefix: lookup(API_PREFIX),
            timeout_secs,
            report_path: read(REPORT_PATH).map(PathBuf::from),
            suite,
            password: read(PASSWORD),
            cleanup,
        };

        if overrides != Self::default() {
            debug!(
                base_url = ?overrides.base_url,
                suite = ?overrides.suite,
                timeout_secs = ?overrides.timeout_secs,
                "Environment overrides loaded"
            );
        }
        Ok(overrides)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
