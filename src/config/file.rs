// src/config/file.rs
// File-based configuration from ~/.tenant-probe/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::suites::Suite;

/// Top-level config structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub target: TargetSection,
    #[serde(default)]
    pub run: RunSection,
}

/// Where the service under test lives
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TargetSection {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// How a run behaves
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RunSection {
    pub suite: Option<Suite>,
    pub cleanup: Option<bool>,
    pub report_path: Option<PathBuf>,
    pub password: Option<String>,
    pub username_prefix: Option<String>,
}

impl FileConfig {
    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// An explicit path must be readable. A missing default file yields an
    /// empty config. A file that exists but does not parse is always an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !path.exists() {
                    debug!(path = %path.display(), "Config file not found, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config from file");
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tenant-probe")
            .join("config.toml")
    }
}
