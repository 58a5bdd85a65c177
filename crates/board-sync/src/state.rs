//! Board state and its reducer
//!
//! Every local mutation is an [`Action`] folded into [`BoardState`] in one
//! step. The reducer is pure; the store publishes its result.

use board_core::{Request, RequestId, StatusUpdate};
use std::collections::HashSet;

/// Observable state of the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Collection, most recent first
    pub requests: Vec<Request>,
    /// A load is in progress
    pub loading: bool,
    /// Most recent failure, shared by all operations
    pub error: Option<String>,
}

impl BoardState {
    /// Find request by id
    #[must_use]
    pub fn find(&self, id: &RequestId) -> Option<&Request> {
        self.requests.iter().find(|r| &r.id == id)
    }

    /// Check if a request with `id` is present
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &RequestId) -> bool {
        self.find(id).is_some()
    }

    /// Apply `action`; returns whether anything changed
    pub fn reduce(&mut self, action: Action) -> bool {
        match action {
            Action::LoadStarted => !std::mem::replace(&mut self.loading, true),
            Action::Loaded { requests, warning } => {
                self.requests = requests;
                self.loading = false;
                self.error = warning;
                true
            }
            Action::LoadFailed(message) => {
                self.loading = false;
                self.error = Some(message);
                true
            }
            Action::Add(request) => {
                self.requests.insert(0, request);
                true
            }
            Action::UpdateStatus(update) => {
                match self.requests.iter_mut().find(|r| r.id == update.id) {
                    Some(request) => {
                        request.apply(&update);
                        true
                    }
                    None => false,
                }
            }
            Action::Remove(id) => {
                let before = self.requests.len();
                self.requests.retain(|r| r.id != id);
                self.requests.len() != before
            }
            Action::RemoveBatch(ids) => {
                let ids: HashSet<RequestId> = ids.into_iter().collect();
                let before = self.requests.len();
                self.requests.retain(|r| !ids.contains(&r.id));
                self.requests.len() != before
            }
            Action::SetError(message) => {
                self.error = Some(message);
                true
            }
            Action::ClearError => self.error.take().is_some(),
        }
    }
}

/// Local state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A load began
    LoadStarted,
    /// A load finished; `warning` replaces the shared error
    Loaded {
        /// New collection, most recent first
        requests: Vec<Request>,
        /// Set when the collection is a degraded substitute
        warning: Option<String>,
    },
    /// A load failed outright
    LoadFailed(String),
    /// Prepend a new request
    Add(Request),
    /// Status change; unknown ids are ignored
    UpdateStatus(StatusUpdate),
    /// Drop one request
    Remove(RequestId),
    /// Drop several requests at once
    RemoveBatch(Vec<RequestId>),
    /// Record an asynchronous failure
    SetError(String),
    /// Dismiss the shared error
    ClearError,
}
