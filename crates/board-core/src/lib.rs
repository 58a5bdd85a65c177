//! Request Board Core
//!
//! Domain types shared by every board crate:
//! - `Request` and its three-state status lifecycle
//! - Validated drafts for new requests
//! - Status updates mirrored to persistence
//! - Configuration and the board/list projections
//!
//! # Example
//!
//! ```rust
//! use board_core::{now, NewRequest, Request, RequestStatus, StatusUpdate};
//!
//! let draft = NewRequest::new("Alice", "Fix login bug").unwrap();
//! let mut request = Request::create(draft, now());
//! assert_eq!(request.status, RequestStatus::Pending);
//!
//! let update = StatusUpdate::stamped(request.id.clone(), RequestStatus::Completed, now());
//! request.apply(&update);
//! assert!(request.completed_at.is_some());
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod projection;
pub mod types;

pub use config::{BoardConfig, LoadPolicy};
pub use error::{ConfigError, ParseStatusError, ValidationError};
pub use projection::{board_columns, list_sections, BoardColumn, ListSections, ViewMode};
pub use types::{now, NewRequest, Request, RequestId, RequestStatus, StatusUpdate, Timestamp};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with board types
    pub use crate::{
        BoardConfig, LoadPolicy, NewRequest, Request, RequestId, RequestStatus, StatusUpdate,
        Timestamp, ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
