//! Request Board Persistence
//!
//! Backends the request store synchronizes through:
//! - `RemoteGateway`: GET-only spreadsheet endpoint client
//! - `LocalStore`: JSON file used as fallback slot
//! - `LocalBackend` and `MirroredBackend` behind `PersistenceBackend`
//!
//! Use [`connect`] to build whichever backend a `BoardConfig` selects.

#![warn(unreachable_pub)]

pub mod backend;
pub mod error;
pub mod local;
pub mod mirrored;
pub mod remote;
mod wire;

pub use backend::{
    connect, BackendMode, Change, PersistenceBackend, SharedBackend, Snapshot, SnapshotSource,
};
pub use error::{
    GatewayError, LocalStoreError, OptimizeError, SyncError, OPTIMIZE_FALLBACK_MESSAGE,
};
pub use local::{LocalBackend, LocalStore};
pub use mirrored::MirroredBackend;
pub use remote::RemoteGateway;
