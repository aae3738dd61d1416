//! # staff-link
//!
//! Authenticated HTTP client core for the Staff admin dashboard.
//!
//! Wraps the dashboard's REST backend with:
//!
//! - Bearer credential injection and a locale header on every call
//! - Reactive, single-flight token refresh: when concurrent requests hit an
//!   expired session, exactly one refresh exchange is issued while every
//!   other request waits, then replays once with the new credential
//! - One normalized error shape (`{ status, title, messages }`) for every
//!   failure a consumer can see
//! - Claims-derived session and role/permission queries for UI gating
//!
//! # Example
//!
//! ```rust,no_run
//! use staff_link::{SessionEvents, StaffLinkClient};
//! use serde_json::Value;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StaffLinkClient::builder()
//!     .base_url("https://hr.example.com")
//!     .events(SessionEvents::new().on_logout(|| {
//!         // navigate to the login route
//!     }))
//!     .build()?;
//!
//! client.login("alice", "secret123").await?;
//!
//! // An expired access token is refreshed and replayed transparently.
//! let employees: Value = client.get("/api/v1/employees").await?;
//!
//! if client.has_role(&["HR", "Admin"]) {
//!     let _: Value = client.post("/api/v1/employees", &employees).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod refresh;
pub mod session;
pub mod timeouts;
pub mod transport;

pub use client::{StaffLinkClient, StaffLinkClientBuilder};
pub use credentials::{Credential, CredentialStore};
pub use error::{Result, StaffLinkError};
pub use models::{
    ApiError, ExternalLoginRequest, HttpMethod, LoginRequest, LoginResponse, TokenClaims, UserInfo,
};
pub use pipeline::{MultipartPart, RequestBody, RequestPipeline, RequestSpec};
pub use refresh::{HttpTokenRefresher, RefreshCoordinator, TokenRefresher};
pub use session::{SessionEvents, SessionManager};
pub use timeouts::StaffLinkTimeouts;
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportRequest};
