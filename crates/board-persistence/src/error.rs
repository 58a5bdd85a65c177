//! Error types for persistence
//!
//! Every failure of a backend call ends up as one of these values; nothing
//! in this crate panics on a bad response.

use std::path::PathBuf;

/// Message used when an optimize call fails without a server message
pub const OPTIMIZE_FALLBACK_MESSAGE: &str = "optimization failed, please try again later";

/// Remote endpoint errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configured endpoint is not a URL
    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// URL parse failure
        #[source]
        source: url::ParseError,
    },

    /// HTTP client could not be built
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never completed
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("server error: HTTP {status} - {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Body is not the expected JSON payload
    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint answered `success: false`
    #[error("{0}")]
    Rejected(String),
}

impl GatewayError {
    /// Check if the call failed before the server could answer it
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Fallback slot errors
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    /// Reading or writing the slot failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Slot content is not a request collection
    #[error("corrupt fallback store {path}: {source}")]
    Corrupt {
        /// Slot file
        path: PathBuf,
        /// JSON parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Collection could not be serialized for writing
    #[error("cannot encode requests for {path}: {source}")]
    Encode {
        /// Slot file
        path: PathBuf,
        /// JSON encode failure
        #[source]
        source: serde_json::Error,
    },
}

impl LocalStoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a single backend synchronization call
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Remote endpoint failed
    #[error("remote sync failed: {0}")]
    Remote(#[from] GatewayError),

    /// Fallback slot failed
    #[error("local store failed: {0}")]
    Local(#[from] LocalStoreError),
}

impl SyncError {
    /// Check if this came from the remote endpoint
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Description optimization errors
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// No remote endpoint configured
    #[error("optimization needs a remote endpoint; set REQUEST_BOARD_ENDPOINT to enable it")]
    Unavailable,

    /// Nothing to optimize
    #[error("description must not be empty")]
    EmptyDescription,

    /// Endpoint answered without usable text
    #[error("{0}")]
    Failed(String),

    /// Call to the endpoint failed
    #[error("optimization failed: {0}")]
    Remote(#[from] GatewayError),
}

impl OptimizeError {
    /// Check if optimization is impossible in the current mode
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
