//! Data models for the staff-link client library.
//!
//! Defines the wire-format request and response structures exchanged with
//! the dashboard backend, plus the normalized error payload every consumer
//! handles.

pub mod api_error;
pub mod external_login_request;
pub mod http_method;
pub mod login_request;
pub mod login_response;
pub mod refresh_request;
pub mod token_claims;
pub mod user_info;
pub mod validation_problem;

pub use api_error::ApiError;
pub use external_login_request::ExternalLoginRequest;
pub use http_method::HttpMethod;
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use refresh_request::RefreshRequest;
pub use token_claims::TokenClaims;
pub use user_info::UserInfo;
pub use validation_problem::ValidationProblem;
