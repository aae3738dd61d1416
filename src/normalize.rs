//! Failure normalization for the staff-link client.
//!
//! This module centralizes the mapping from transport-level and HTTP-level
//! failures into the one [`ApiError`] shape every consumer handles:
//!
//! - no response received -> `status = 0`, generic network-error title
//! - structured validation body -> field messages flattened in payload order
//! - anything else -> the payload's title, or a generic request-failed title

use crate::error::StaffLinkError;
use crate::models::{ApiError, ValidationProblem};
use crate::transport::RawResponse;

/// Map a transport failure (no response received) to the normalized shape.
pub fn from_transport(err: reqwest::Error) -> StaffLinkError {
    StaffLinkError::NetworkError(ApiError::network(err.to_string()))
}

/// Map a non-success HTTP response to the normalized shape.
///
/// Authentication takes precedence: a 401 is always an
/// [`StaffLinkError::AuthenticationError`], whatever the body looks like.
pub fn error_from_response(response: &RawResponse) -> StaffLinkError {
    let status = response.status;
    let problem: Option<ValidationProblem> = serde_json::from_slice(&response.body).ok();

    if status == 401 {
        let title = problem
            .and_then(|p| p.title)
            .unwrap_or_else(|| "Unauthorized".to_string());
        return StaffLinkError::AuthenticationError(ApiError::new(status, title.clone(), title));
    }

    if let Some(problem) = problem.as_ref().filter(|p| p.has_errors()) {
        let title = problem
            .title
            .clone()
            .unwrap_or_else(|| "Validation failed".to_string());
        return StaffLinkError::ValidationError(ApiError {
            status,
            title,
            messages: problem.flatten_messages(),
        });
    }

    let title = problem
        .and_then(|p| p.title)
        .unwrap_or_else(|| "Request failed".to_string());
    StaffLinkError::ServerError(ApiError::new(status, title.clone(), title))
}
