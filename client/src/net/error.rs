//! Backend error taxonomy and response-body message extraction.
//!
//! ERROR HANDLING
//! ==============
//! `Display` output is user-facing: auth and write failures are rendered
//! inline as-is, so messages come from the backend body when it has one.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by backend table, identity, and realtime calls.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The identity service rejected the request (bad credentials, etc.).
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// The table API rejected a read or write.
    #[error("{message}")]
    Query { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Browser-only operation invoked during server rendering.
    #[error("not available on server")]
    Unavailable,
}

impl BackendError {
    /// Build an identity-service error from a non-OK response.
    #[must_use]
    pub fn auth(status: u16, body: &str) -> Self {
        Self::Auth { status, message: response_message(status, body) }
    }

    /// Build a table-API error from a non-OK response.
    #[must_use]
    pub fn query(status: u16, body: &str) -> Self {
        Self::Query { status, message: response_message(status, body) }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Query { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract the user-facing message from an error response body.
///
/// Checks `error_description`, `msg`, `message`, then `error`; falls back to
/// a status line when the body is empty or not JSON.
pub(crate) fn response_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        })
        .filter(|message| !message.trim().is_empty())
        .map_or_else(|| request_failed_message(status), str::to_owned)
}

pub(crate) fn request_failed_message(status: u16) -> String {
    format!("request failed: {status}")
}
