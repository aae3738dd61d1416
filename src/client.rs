//! Main staff-link client with builder pattern.
//!
//! Provides the consumer-facing surface: the four verbs, multipart upload,
//! login/logout, and the session queries the UI's gating layer reads.

use crate::credentials::{Credential, CredentialStore};
use crate::error::{Result, StaffLinkError};
use crate::models::{ExternalLoginRequest, LoginRequest, LoginResponse};
use crate::pipeline::{MultipartPart, RequestPipeline, RequestSpec};
use crate::refresh::{HttpTokenRefresher, RefreshCoordinator, TokenRefresher};
use crate::session::{SessionEvents, SessionManager};
use crate::timeouts::StaffLinkTimeouts;
use crate::transport::{HttpTransport, RawResponse, ReqwestTransport};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};

const LOGIN_PATH: &str = "/api/v1/auth/login";
const REFRESH_PATH: &str = "/api/v1/auth/refresh";
const EXTERNAL_LOGIN_PATH: &str = "/api/v1/auth/external";

/// Authenticated HTTP client for the dashboard backend.
///
/// Construct once per session via [`StaffLinkClient::builder`] and pass by
/// reference (or cheap clone; clones share all state) to consumers. There
/// is deliberately no global instance.
///
/// # Examples
///
/// ```rust,no_run
/// use staff_link::StaffLinkClient;
/// use serde_json::Value;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StaffLinkClient::builder()
///     .base_url("https://hr.example.com")
///     .build()?;
///
/// client.login("alice", "secret123").await?;
/// let employees: Value = client.get("/api/v1/employees").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StaffLinkClient {
    pipeline: RequestPipeline,
    session: SessionManager,
    locale: Arc<RwLock<String>>,
}

impl StaffLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> StaffLinkClientBuilder {
        StaffLinkClientBuilder::new()
    }

    /// GET a resource and decode the JSON payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.pipeline.execute(&RequestSpec::get(path)).await?;
        decode_payload(&response)
    }

    /// POST a JSON body and decode the JSON payload
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.pipeline.execute(&RequestSpec::post(path, body)?).await?;
        decode_payload(&response)
    }

    /// PUT a JSON body and decode the JSON payload
    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.pipeline.execute(&RequestSpec::put(path, body)?).await?;
        decode_payload(&response)
    }

    /// DELETE a resource and decode the JSON payload.
    ///
    /// Empty bodies decode as JSON `null`, so `()` and `Option<T>` both work
    /// for 204-style responses.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.pipeline.execute(&RequestSpec::delete(path)).await?;
        decode_payload(&response)
    }

    /// POST a multipart body (file uploads) and decode the JSON payload
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<MultipartPart>,
    ) -> Result<T> {
        let response = self
            .pipeline
            .execute(&RequestSpec::post_multipart(path, parts))
            .await?;
        decode_payload(&response)
    }

    /// Authenticate with username and password and install the returned
    /// credential pair.
    ///
    /// The login call itself is exempt from bearer injection and from the
    /// 401 interception path.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        debug!("[LOGIN] Authenticating user '{}'", username);
        let spec = RequestSpec::post(LOGIN_PATH, &request)?.exempt();
        let response = self.pipeline.execute(&spec).await?;
        let login: LoginResponse = decode_payload(&response)?;
        self.session.establish(login.credential());
        debug!("[LOGIN] Authenticated user '{}'", username);
        Ok(login)
    }

    /// Exchange a third-party identity token for a first-party credential
    /// pair. Exempt like login.
    pub async fn login_external(&self, request: &ExternalLoginRequest) -> Result<LoginResponse> {
        debug!(
            "[LOGIN] Exchanging external identity token (provider '{}')",
            request.provider
        );
        let spec = RequestSpec::post(EXTERNAL_LOGIN_PATH, request)?.exempt();
        let response = self.pipeline.execute(&spec).await?;
        let login: LoginResponse = decode_payload(&response)?;
        self.session.establish(login.credential());
        Ok(login)
    }

    /// End the session: clear credentials and send the host to its login
    /// entry point. Idempotent.
    pub fn logout(&self) {
        self.session.logout();
    }

    /// True when a credential pair is present
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// True when the current user holds any of the listed roles
    pub fn has_role(&self, roles: &[&str]) -> bool {
        self.session.has_role(roles)
    }

    /// True when the current user holds any of the listed permissions
    pub fn has_permission(&self, permissions: &[&str]) -> bool {
        self.session.has_permission(permissions)
    }

    /// Access check for a guarded action: any listed role or any listed
    /// permission grants
    pub fn is_granted(&self, roles: &[&str], permissions: &[&str]) -> bool {
        self.session.is_granted(roles, permissions)
    }

    /// The session query surface, for handing to gating code separately
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Change the locale attached to outgoing requests
    pub fn set_locale(&self, locale: impl Into<String>) {
        *self.locale.write().unwrap() = locale.into();
    }

    /// Locale currently attached to outgoing requests
    pub fn locale(&self) -> String {
        self.locale.read().unwrap().clone()
    }
}

/// Decode a raw response body; empty bodies decode as JSON `null`.
fn decode_payload<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    if response.body.is_empty() {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| StaffLinkError::SerializationError(e.to_string()));
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| StaffLinkError::SerializationError(e.to_string()))
}

/// Builder for configuring [`StaffLinkClient`] instances.
pub struct StaffLinkClientBuilder {
    base_url: Option<String>,
    locale: String,
    timeouts: StaffLinkTimeouts,
    events: SessionEvents,
    transport: Option<Arc<dyn HttpTransport>>,
    credential: Option<Credential>,
}

impl StaffLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            locale: "en".to_string(),
            timeouts: StaffLinkTimeouts::default(),
            events: SessionEvents::new(),
            transport: None,
            credential: None,
        }
    }

    /// Set the base URL of the dashboard backend (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the initial UI locale (default "en")
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set timeout configuration for all operations
    pub fn timeouts(mut self, timeouts: StaffLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set host application hooks for session lifecycle events
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = events;
        self
    }

    /// Replace the HTTP transport (custom stacks, scripted tests)
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Restore a persisted credential pair from a previous session
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<StaffLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| StaffLinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.timeouts)?),
        };

        let store = CredentialStore::new();
        if let Some(credential) = self.credential {
            store.set(credential);
        }

        let locale = Arc::new(RwLock::new(self.locale));
        let session = SessionManager::new(store.clone(), self.events.clone());
        let refresher: Arc<dyn TokenRefresher> = Arc::new(HttpTokenRefresher::new(
            transport.clone(),
            format!("{}{}", base_url, REFRESH_PATH),
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher,
            store.clone(),
            self.events,
            self.timeouts.refresh_timeout,
        ));
        let pipeline = RequestPipeline::new(
            transport,
            store,
            coordinator,
            session.clone(),
            base_url,
            locale.clone(),
        );

        Ok(StaffLinkClient {
            pipeline,
            session,
            locale,
        })
    }
}
