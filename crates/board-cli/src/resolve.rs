//! Id prefix resolution

use board_core::{Request, RequestId};

/// Prefix did not name exactly one request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing matched
    #[error("no request matches '{0}'")]
    NotFound(String),

    /// More than one match
    #[error("'{prefix}' matches {count} requests; use a longer prefix")]
    Ambiguous {
        /// Prefix as given
        prefix: String,
        /// Number of matching requests
        count: usize,
    },
}

/// Find the one request whose id is `prefix` or starts with it
pub fn resolve(requests: &[Request], prefix: &str) -> Result<RequestId, ResolveError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(ResolveError::NotFound(String::new()));
    }
    if let Some(exact) = requests.iter().find(|r| r.id.as_str() == prefix) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&Request> = requests.iter().filter(|r| r.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(ResolveError::NotFound(prefix.to_string())),
        many => Err(ResolveError::Ambiguous {
            prefix: prefix.to_string(),
            count: many.len(),
        }),
    }
}
