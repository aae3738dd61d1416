//! Outgoing request pipeline.
//!
//! Attaches bearer and locale headers, dispatches through the transport,
//! and owns the 401 interception path: a first authentication failure on a
//! non-exempt request asks the refresh coordinator for a fresh credential
//! and replays the request exactly once; a second failure, or any failure
//! on an exempt login/refresh call, ends the session.

use crate::credentials::CredentialStore;
use crate::error::{Result, StaffLinkError};
use crate::models::HttpMethod;
use crate::normalize;
use crate::refresh::RefreshCoordinator;
use crate::session::SessionManager;
use crate::transport::{HttpTransport, RawResponse, TransportRequest};
use bytes::Bytes;
use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// One part of a multipart upload.
///
/// Parts own their bytes so a replay after a token refresh can rebuild the
/// form from scratch.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Form field name
    pub name: String,
    /// Original file name, when uploading a file
    pub file_name: Option<String>,
    /// MIME type of the part, when known
    pub content_type: Option<String>,
    /// Part payload
    pub data: Bytes,
}

impl MultipartPart {
    /// A plain form field.
    pub fn bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// A file upload part.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }
}

/// Request body variants.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON payload; the transport sets the JSON content type
    Json(serde_json::Value),
    /// Multipart payload; the JSON content type is omitted
    Multipart(Vec<MultipartPart>),
}

/// Describes one logical API call.
///
/// Immutable once constructed: replay state is tracked by the pipeline per
/// call, never by mutating the spec, so concurrent holders of the same spec
/// can not observe each other.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP verb
    pub method: HttpMethod,
    /// Path relative to the client's base URL (may include a query string)
    pub path: String,
    /// Request body
    pub body: RequestBody,
    /// Set on login/refresh/external-auth calls: no bearer injection and no
    /// 401 interception, so a failing auth call can never re-enter the
    /// refresh coordinator.
    pub bypass_auth: bool,
}

impl RequestSpec {
    /// GET request with no body
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: RequestBody::Empty,
            bypass_auth: false,
        }
    }

    /// DELETE request with no body
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            ..Self::get(path)
        }
    }

    /// POST request with a JSON body
    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Json(
                serde_json::to_value(body)
                    .map_err(|e| StaffLinkError::SerializationError(e.to_string()))?,
            ),
            bypass_auth: false,
        })
    }

    /// PUT request with a JSON body
    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        let mut spec = Self::post(path, body)?;
        spec.method = HttpMethod::Put;
        Ok(spec)
    }

    /// POST request with a multipart body (file uploads)
    pub fn post_multipart(path: impl Into<String>, parts: Vec<MultipartPart>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Multipart(parts),
            bypass_auth: false,
        }
    }

    /// Mark this call exempt from credential injection and 401 interception.
    pub fn exempt(mut self) -> Self {
        self.bypass_auth = true;
        self
    }
}

/// Executes request specs: header attachment, dispatch, 401 interception,
/// and the single replay after a successful refresh.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn HttpTransport>,
    store: CredentialStore,
    coordinator: Arc<RefreshCoordinator>,
    session: SessionManager,
    base_url: String,
    locale: Arc<RwLock<String>>,
}

impl RequestPipeline {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        store: CredentialStore,
        coordinator: Arc<RefreshCoordinator>,
        session: SessionManager,
        base_url: String,
        locale: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
            session,
            base_url,
            locale,
        }
    }

    /// Execute one logical call, replaying at most once after a refresh.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<RawResponse> {
        // Replay state lives here, not on the spec.
        let mut retried = false;
        loop {
            let response = self.dispatch(spec).await?;
            if response.is_success() {
                return Ok(response);
            }

            if response.status != 401 || spec.bypass_auth || retried {
                if response.status == 401 {
                    // Terminal: either the second 401 for this call, or an
                    // exempt auth endpoint rejecting itself.
                    warn!(
                        "[AUTH_HTTP] Terminal 401 on {} {}, ending session",
                        spec.method, spec.path
                    );
                    self.session.logout();
                }
                return Err(normalize::error_from_response(&response));
            }

            debug!(
                "[AUTH_HTTP] 401 on {} {}, requesting fresh credential",
                spec.method, spec.path
            );
            match self.coordinator.obtain_fresh_credential().await {
                // The next dispatch reads the new pair from the store
                Ok(_) => retried = true,
                Err(err) => {
                    self.session.logout();
                    return Err(err);
                }
            }
        }
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<RawResponse> {
        let mut headers = Vec::new();
        if !spec.bypass_auth {
            if let Some(credential) = self.store.get() {
                headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", credential.access_token),
                ));
            }
        }
        headers.push((
            "Accept-Language".to_string(),
            self.locale.read().unwrap().clone(),
        ));

        let request = TransportRequest {
            method: spec.method,
            url: format!("{}{}", self.base_url, spec.path),
            headers,
            body: spec.body.clone(),
        };

        debug!("[AUTH_HTTP] {} {}", spec.method, spec.path);
        self.transport.send(request).await
    }
}
