//! Read-only views over the request collection
//!
//! Both projections keep the collection order (most recent first).

use crate::types::{Request, RequestStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which projection to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One column per status
    #[default]
    Board,
    /// Open and completed sections
    List,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "board" | "kanban" => Ok(ViewMode::Board),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view '{other}' (expected board or list)")),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Board => f.write_str("board"),
            ViewMode::List => f.write_str("list"),
        }
    }
}

/// A single board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn<'a> {
    /// Status this column collects
    pub status: RequestStatus,
    /// Requests in collection order
    pub requests: Vec<&'a Request>,
}

impl BoardColumn<'_> {
    /// Number of cards
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// True when the column has no cards
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Split into pending, in-progress and completed columns
#[must_use]
pub fn board_columns(requests: &[Request]) -> [BoardColumn<'_>; 3] {
    RequestStatus::ALL.map(|status| BoardColumn {
        status,
        requests: requests.iter().filter(|r| r.status == status).collect(),
    })
}

/// Two-section list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSections<'a> {
    /// Everything not completed (pending and in-progress)
    pub open: Vec<&'a Request>,
    /// Completed requests
    pub completed: Vec<&'a Request>,
}

/// Split into open and completed sections
#[must_use]
pub fn list_sections(requests: &[Request]) -> ListSections<'_> {
    let (completed, open): (Vec<&Request>, Vec<&Request>) =
        requests.iter().partition(|r| r.status.is_completed());
    ListSections { open, completed }
}
