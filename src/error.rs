//! Error types for the staff-link client library.
//!
//! Every failure the client surfaces is one of these variants, and every
//! variant can be reduced to the normalized [`ApiError`] payload via
//! [`StaffLinkError::details`], so UI callers handle exactly one error shape.

use crate::models::ApiError;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, StaffLinkError>;

/// Errors surfaced by the staff-link client.
///
/// Variants are `Clone` so a single refresh failure can be fanned out to
/// every request queued behind the refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StaffLinkError {
    /// No response reached the server (DNS, connect, timeout).
    /// The payload title already reads "Network error".
    #[error("{0}")]
    NetworkError(ApiError),

    /// The server rejected the request's credentials (HTTP 401),
    /// or the refresh exchange itself failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(ApiError),

    /// Structured field-level validation failure; messages are surfaced
    /// verbatim for the UI to render.
    #[error("Validation failed: {0}")]
    ValidationError(ApiError),

    /// Any other non-success HTTP response.
    #[error("Server error: {0}")]
    ServerError(ApiError),

    /// Client-side misconfiguration (bad base URL, invalid part type, ...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StaffLinkError {
    /// The normalized `{ status, title, messages }` payload for this error.
    pub fn details(&self) -> ApiError {
        match self {
            Self::NetworkError(details)
            | Self::AuthenticationError(details)
            | Self::ValidationError(details)
            | Self::ServerError(details) => details.clone(),
            Self::ConfigurationError(message) => {
                ApiError::new(0, "Configuration error", message.clone())
            }
            Self::SerializationError(message) => {
                ApiError::new(0, "Unexpected response", message.clone())
            }
        }
    }

    /// True for authentication failures (expired or rejected credentials).
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }
}
