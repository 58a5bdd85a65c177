//! Core request types
//!
//! Defines the single entity tracked by the board:
//! - Request identifiers
//! - The three-state status lifecycle
//! - Validated drafts for new requests
//! - Status updates mirrored to persistence backends

use crate::error::{ParseStatusError, ValidationError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp carried by every request field
pub type Timestamp = DateTime<Utc>;

/// Current time truncated to millisecond precision
///
/// Memory, the fallback slot and the remote sheet all hold this exact value,
/// so serialized copies compare equal to the in-memory one.
#[inline]
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Unique request identifier
///
/// Freshly created requests get a random UUID. Identifiers read back from a
/// backend are kept verbatim, since spreadsheet rows may carry any string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate new random identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this id starts with `prefix`
    #[inline]
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Request lifecycle status
///
/// Any status may move to any other; the board lets a card be dropped on
/// any column. Reading accepts the same spellings as `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum RequestStatus {
    /// Submitted, not started
    Pending,
    /// Being worked on
    InProgress,
    /// Done
    Completed,
}

impl RequestStatus {
    /// All statuses in board column order
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::InProgress => "In progress",
            RequestStatus::Completed => "Completed",
        }
    }

    /// Check if this is the terminal status
    #[inline]
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, RequestStatus::Completed)
    }

    /// Completion timestamp a request gets when moved to this status
    #[inline]
    #[must_use]
    pub fn completion_stamp(self, at: Timestamp) -> Option<Timestamp> {
        self.is_completed().then_some(at)
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated input for a new request
///
/// Both fields are trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    requester: String,
    description: String,
}

impl NewRequest {
    /// Validate raw form input
    ///
    /// # Errors
    /// - `ValidationError::EmptyRequester` if the requester is blank
    /// - `ValidationError::EmptyDescription` if the description is blank
    pub fn new(
        requester: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let requester = requester.as_ref().trim();
        let description = description.as_ref().trim();

        if requester.is_empty() {
            return Err(ValidationError::EmptyRequester);
        }
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        Ok(Self {
            requester: requester.to_string(),
            description: description.to_string(),
        })
    }

    /// Trimmed requester
    #[inline]
    #[must_use]
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Trimmed description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A tracked request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique identifier
    pub id: RequestId,
    /// Who asked
    pub requester: String,
    /// What was asked
    pub description: String,
    /// Current status
    pub status: RequestStatus,
    /// Creation time
    pub created_at: Timestamp,
    /// Set iff status is completed
    #[serde(default, deserialize_with = "blank_as_none")]
    pub completed_at: Option<Timestamp>,
}

impl Request {
    /// Create a pending request from a validated draft
    #[must_use]
    pub fn create(draft: NewRequest, at: Timestamp) -> Self {
        Self {
            id: RequestId::new(),
            requester: draft.requester,
            description: draft.description,
            status: RequestStatus::Pending,
            created_at: at,
            completed_at: None,
        }
    }

    /// Apply a status update, status and completion stamp only
    #[inline]
    pub fn apply(&mut self, update: &StatusUpdate) {
        self.status = update.status;
        self.completed_at = update.completed_at;
    }

    /// Check `completed_at` is set exactly when completed
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.status.is_completed() == self.completed_at.is_some()
    }
}

/// Status change mirrored to persistence
///
/// Carries only the fields a backend `update` is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// Target request
    pub id: RequestId,
    /// New status
    pub status: RequestStatus,
    /// Completion stamp derived from `status`
    pub completed_at: Option<Timestamp>,
}

impl StatusUpdate {
    /// Build update stamped at `at` when moving to completed
    #[inline]
    #[must_use]
    pub fn stamped(id: RequestId, status: RequestStatus, at: Timestamp) -> Self {
        Self {
            id,
            status,
            completed_at: status.completion_stamp(at),
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
