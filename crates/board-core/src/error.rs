//! Error types for board core
//!
//! Covers:
//! - Rejected form input
//! - Unknown status names
//! - Configuration loading

use std::path::PathBuf;

/// Rejected input for a new request
///
/// Callers treat this as a silent guard; it is never recorded as a store
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Requester is empty after trimming
    #[error("requester must not be empty")]
    EmptyRequester,

    /// Description is empty after trimming
    #[error("description must not be empty")]
    EmptyDescription,
}

/// Unknown status name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected pending, in-progress or completed)")]
pub struct ParseStatusError(pub String);

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `BoardConfig`
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// TOML parse failure
        #[source]
        source: toml::de::Error,
    },

    /// A field holds an unusable value
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },
}

impl ConfigError {
    /// Create invalid value error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
