//! HTTP transport seam for the staff-link client.
//!
//! [`HttpTransport`] abstracts the wire so the request pipeline can be
//! exercised against scripted responses in tests; [`ReqwestTransport`] is
//! the production implementation.

use crate::error::{Result, StaffLinkError};
use crate::models::HttpMethod;
use crate::normalize;
use crate::pipeline::{MultipartPart, RequestBody};
use crate::timeouts::StaffLinkTimeouts;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// A fully prepared outgoing request: resolved URL, final headers, body.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Absolute URL (base URL + path)
    pub url: String,
    /// Header name/value pairs attached by the pipeline
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

/// An undecoded HTTP response: status plus raw body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

impl RawResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Dispatches prepared requests to the backend.
///
/// Implement this to run the client over a different HTTP stack, or to
/// script responses in tests. Receiving a response of any status is `Ok`;
/// `Err` means no response reached the server.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return the raw response.
    async fn send(&self, request: TransportRequest) -> Result<RawResponse>;
}

/// Production transport backed by a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the underlying HTTP client with connection pooling.
    pub fn new(timeouts: &StaffLinkTimeouts) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeouts.receive_timeout)
            .connect_timeout(timeouts.connection_timeout)
            // Keep-alive connections reduce TCP handshake overhead
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| StaffLinkError::ConfigurationError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            // Multipart bodies must not carry the JSON content type;
            // reqwest sets the boundary header itself.
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await.map_err(normalize::from_transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(normalize::from_transport)?;
        Ok(RawResponse { status, body })
    }
}

fn build_form(parts: Vec<MultipartPart>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut piece = reqwest::multipart::Part::bytes(part.data.to_vec());
        if let Some(file_name) = part.file_name {
            piece = piece.file_name(file_name);
        }
        if let Some(content_type) = &part.content_type {
            piece = piece.mime_str(content_type).map_err(|e| {
                StaffLinkError::ConfigurationError(format!(
                    "invalid content type '{}': {}",
                    content_type, e
                ))
            })?;
        }
        form = form.part(part.name, piece);
    }
    Ok(form)
}
