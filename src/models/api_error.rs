use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized error payload surfaced to every consumer of the client.
///
/// All transport-level, HTTP-level, and unexpected failures are reduced to
/// this one shape before they cross the crate boundary, so UI callers only
/// ever handle a single error contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code; `0` when no response reached the server.
    pub status: u16,

    /// Short human-readable summary ("Bad Request", "Network error", ...).
    pub title: String,

    /// Flattened detail messages, e.g. field-level validation errors
    /// in the order the server reported them.
    pub messages: Vec<String>,
}

impl ApiError {
    /// Create an error with a status, title, and a single message.
    pub fn new(status: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            messages: vec![message.into()],
        }
    }

    /// Connectivity failure: no response was received (`status = 0`).
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(0, "Network error", detail)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.messages.is_empty() && self.messages[0] != self.title {
            write!(f, ": {}", self.messages.join("; "))?;
        }
        Ok(())
    }
}
