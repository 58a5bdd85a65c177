//! Error types for the request store

use board_core::ConfigError;
use board_persistence::GatewayError;

/// Store construction errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Backend could not be built
    #[error("backend setup failed: {0}")]
    Backend(#[from] GatewayError),
}
