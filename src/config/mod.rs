// src/config/mod.rs
// Harness configuration: defaults, then file, then environment, then CLI

pub mod env;
pub mod file;

pub use env::EnvOverrides;
pub use file::FileConfig;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{ProbeError, Result};
use crate::suites::Suite;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_PASSWORD: &str = "TestPassword123!";
pub const DEFAULT_USERNAME_PREFIX: &str = "testuser";

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout_secs: u64,
    pub suite: Suite,
    pub cleanup: bool,
    /// Explicit artifact path; the suite's default is used when unset
    pub report_path: Option<PathBuf>,
    pub password: String,
    pub username_prefix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            suite: Suite::default(),
            cleanup: true,
            report_path: None,
            password: DEFAULT_PASSWORD.to_string(),
            username_prefix: DEFAULT_USERNAME_PREFIX.to_string(),
        }
    }
}

impl HarnessConfig {
    /// Defaults, overlaid with the config file and then the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_file(FileConfig::load(config_path)?);
        config.apply_env(EnvOverrides::from_env()?);
        debug!(?config, "Configuration resolved");
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        let FileConfig { target, run } = file;
        if let Some(base_url) = target.base_url {
            self.base_url = base_url;
        }
        if let Some(prefix) = target.api_prefix {
            self.api_prefix = prefix;
        }
        if let Some(timeout) = target.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(suite) = run.suite {
            self.suite = suite;
        }
        if let Some(cleanup) = run.cleanup {
            self.cleanup = cleanup;
        }
        if let Some(path) = run.report_path {
            self.report_path = Some(path);
        }
        if let Some(password) = run.password {
            self.password = password;
        }
        if let Some(prefix) = run.username_prefix {
            self.username_prefix = prefix;
        }
    }

    pub fn apply_env(&mut self, env: EnvOverrides) {
        if let Some(base_url) = env.base_url {
            self.base_url = base_url;
        }
        if let Some(prefix) = env.api_prefix {
            self.api_prefix = prefix;
        }
        if let Some(timeout) = env.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(suite) = env.suite {
            self.suite = suite;
        }
        if let Some(cleanup) = env.cleanup {
            self.cleanup = cleanup;
        }
        if let Some(path) = env.report_path {
            self.report_path = Some(path);
        }
        if let Some(password) = env.password {
            self.password = password;
        }
    }

    /// Base URL joined with the API prefix, without a trailing slash
    pub fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.suite.default_report_path()))
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::Config(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ProbeError::Config(format!(
                "timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {}",
                self.timeout_secs
            )));
        }
        if self.password.is_empty() {
            return Err(ProbeError::Config("password must not be empty".to_string()));
        }
        if self.username_prefix.trim().is_empty() {
            return Err(ProbeError::Config("username prefix must not be empty".to_string()));
        }
        Ok(())
    }
}
