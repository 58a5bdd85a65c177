//! Request Board Sync
//!
//! Optimistic, single-writer store over a persistence backend:
//! - Local state changes apply immediately, in command order
//! - Backend calls run detached and may finish out of order
//! - Failures land in one shared error slot and the operation journal
//!
//! # Example
//!
//! ```rust,no_run
//! use board_core::{BoardConfig, RequestStatus};
//! use board_sync::RequestStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RequestStore::connect(&BoardConfig::new())?;
//! store.load().await;
//!
//! let request = store.create("Alice", "Fix login bug")?;
//! store.change_status(&request.id, RequestStatus::InProgress);
//! store.settle().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod journal;
pub mod state;
pub mod store;

pub use error::StoreError;
pub use journal::{
    OperationId, OperationJournal, OperationKind, OperationRecord, Outcome, DEFAULT_JOURNAL_CAPACITY,
};
pub use state::{Action, BoardState};
pub use store::RequestStore;
