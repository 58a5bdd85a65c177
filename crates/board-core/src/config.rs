//! Board configuration
//!
//! Resolution order: TOML file, then environment, then explicit overrides
//! from the caller (CLI flags). An absent or blank endpoint selects the
//! local-only fallback mode.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the remote endpoint
pub const ENDPOINT_ENV: &str = "REQUEST_BOARD_ENDPOINT";

/// Environment variable holding the fallback slot path
pub const DATA_ENV: &str = "REQUEST_BOARD_DATA";

/// Default fallback slot file name
pub const DEFAULT_FALLBACK_FILE: &str = "colleague-requests.json";

/// What `load` does with backend calls still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPolicy {
    /// Wait for dispatched calls to finish before fetching
    #[default]
    DrainPending,
    /// Fetch right away; unsynced optimistic changes may be overwritten
    Immediate,
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Remote spreadsheet endpoint; `None` or blank means local only
    pub endpoint: Option<String>,
    /// Fallback slot file
    pub fallback_path: PathBuf,
    /// Per-call timeout for the remote endpoint; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
    /// In-flight handling for `load`
    pub load_policy: LoadPolicy,
    /// Rewrite the fallback slot with every successful remote snapshot
    pub refresh_fallback_on_load: bool,
}

impl BoardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With remote endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// With fallback slot path
    #[inline]
    #[must_use]
    pub fn with_fallback_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = path.into();
        self
    }

    /// With remote call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// With load policy
    #[inline]
    #[must_use]
    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    /// Configured endpoint, if usable
    #[must_use]
    pub fn remote_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// True when no remote endpoint is configured
    #[inline]
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.remote_endpoint().is_none()
    }

    /// Remote call timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` if the text is not a valid config
    pub fn from_toml_str(text: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.as_ref().to_path_buf(),
            source,
        })
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if its content is invalid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(path) = lookup(DATA_ENV).filter(|p| !p.trim().is_empty()) {
            self.fallback_path = PathBuf::from(path);
        }
        self
    }

    /// Check field values
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for a non-http endpoint, a zero timeout or
    /// an empty fallback path
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = self.remote_endpoint() {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::invalid(
                    "endpoint",
                    format!("'{endpoint}' is not an http(s) URL"),
                ));
            }
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.fallback_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("fallback_path", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_FILE),
            request_timeout_secs: None,
            load_policy: LoadPolicy::default(),
            refresh_fallback_on_load: true,
        }
    }
}
