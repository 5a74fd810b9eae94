//! Run settings, optionally loaded from a YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration:
//!
//! ```yaml
//! workers: 16
//! deadline_secs: 120
//! document_policy: keep   # or `drop`
//! fetch:
//!   timeout_secs: 10
//!   accept_invalid_certs: true
//!   user_agent: "uredni_desky/0.1"
//! ```

use crate::error::ConfigError;
use crate::extract::DocumentPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WORKERS: usize = 16;

/// HTTP settings shared read-only by every fetch in a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate validation. Several municipal endpoints serve
    /// broken certificate chains, so this is on unless turned off.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: true,
            user_agent: concat!("uredni_desky/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub fetch: FetchSettings,
    /// Upper bound on concurrently running fetches.
    pub workers: usize,
    /// Overall deadline for one aggregation run, in seconds.
    pub deadline_secs: Option<u64>,
    pub document_policy: DocumentPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            workers: DEFAULT_WORKERS,
            deadline_secs: None,
            document_policy: DocumentPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml_str(&raw)?;
        info!(?settings, "Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}
