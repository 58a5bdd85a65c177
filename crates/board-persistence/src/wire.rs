//! Wire format of the spreadsheet endpoint
//!
//! Every call is a GET with URL-query parameters:
//!
//! ```text
//! ?action=getAll                                   -> {"requests": [...]}
//! ?action=add&id&requester&description&status&createdAt&completedAt
//! ?action=update&id&status&completedAt            -> {"success": bool, "error"?: str}
//! ?action=delete&id
//! ?action=optimize&description                     -> {"success", "optimized"?, "error"?}
//! ```

use board_core::{Request, RequestId, StatusUpdate, Timestamp};
use chrono::SecondsFormat;
use serde::Deserialize;
use std::fmt;

/// Endpoint action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    GetAll,
    Add,
    Update,
    Delete,
    Optimize,
}

impl Action {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Action::GetAll => "getAll",
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Optimize => "optimize",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters, in the order they are sent
pub(crate) type Params = Vec<(&'static str, String)>;

#[derive(Debug, Deserialize)]
pub(crate) struct RequestsEnvelope {
    #[serde(default)]
    pub(crate) requests: Option<Vec<Request>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptimizeReply {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) optimized: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Null stamps travel as empty strings
pub(crate) fn stamp(at: Option<Timestamp>) -> String {
    at.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

pub(crate) fn add_params(request: &Request) -> Params {
    vec![
        ("id", request.id.to_string()),
        ("requester", request.requester.clone()),
        ("description", request.description.clone()),
        ("status", request.status.as_str().to_string()),
        ("createdAt", stamp(Some(request.created_at))),
        ("completedAt", stamp(request.completed_at)),
    ]
}

pub(crate) fn update_params(update: &StatusUpdate) -> Params {
    vec![
        ("id", update.id.to_string()),
        ("status", update.status.as_str().to_string()),
        ("completedAt", stamp(update.completed_at)),
    ]
}

pub(crate) fn delete_params(id: &RequestId) -> Params {
    vec![("id", id.to_string())]
}

pub(crate) fn optimize_params(description: &str) -> Params {
    vec![("description", description.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::{now, NewRequest, RequestStatus};
    use chrono::TimeZone;

    #[test]
    fn null_stamp_is_empty() {
        assert_eq!(stamp(None), "");
    }

    #[test]
    fn stamp_uses_millis_and_z() {
        let at = chrono::Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .single()
            .unwrap();
        assert_eq!(stamp(Some(at)), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn update_params_carry_only_status_fields() {
        let update = StatusUpdate::stamped("r-1".into(), RequestStatus::InProgress, now());
        let params = update_params(&update);

        assert_eq!(
            params,
            vec![
                ("id", "r-1".to_string()),
                ("status", "in-progress".to_string()),
                ("completedAt", String::new()),
            ]
        );
    }

    #[test]
    fn add_params_cover_every_field() {
        let request = Request::create(NewRequest::new("Alice", "Fix login bug").unwrap(), now());
        let names: Vec<&str> = add_params(&request).iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["id", "requester", "description", "status", "createdAt", "completedAt"]
        );
    }

    #[test]
    fn envelope_tolerates_missing_requests() {
        let envelope: RequestsEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.requests.is_none());

        let envelope: RequestsEnvelope = serde_json::from_str(r#"{"requests": null}"#).unwrap();
        assert!(envelope.requests.is_none());
    }

    #[test]
    fn ack_defaults_to_failure() {
        let ack: Ack = serde_json::from_str("{}").unwrap();
        assert!(!ack.success);
        assert!(ack.error.is_none());
    }
}
