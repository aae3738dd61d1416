//! Credential storage for the staff-link client.
//!
//! Holds the current access/refresh token pair behind a cheaply cloneable
//! handle. Writers are deliberately few: a successful login, a successful
//! refresh (the coordinator), and logout (the session manager). The request
//! pipeline only reads. Persistence to any session-scoped medium is the host
//! application's concern (subscribe via `SessionEvents`).

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// An access/refresh token pair.
///
/// No expiry timestamp is tracked client-side; expiration is discovered
/// reactively through a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Short-lived bearer token attached to API calls
    pub access_token: String,

    /// Longer-lived token exchanged for a new pair when the access
    /// token expires
    pub refresh_token: String,
}

impl Credential {
    /// Create a new credential pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// True when a refresh token is present to exchange.
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Shared handle to the current credential pair.
///
/// Clones share the same underlying slot. Reads and writes are single
/// atomic assignments under a lock; no partial update is ever visible.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    /// Create an empty (unauthenticated) store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current credential pair, or `None` if unauthenticated
    pub fn get(&self) -> Option<Credential> {
        self.inner.read().unwrap().clone()
    }

    /// Overwrite the stored pair atomically
    pub fn set(&self, credential: Credential) {
        *self.inner.write().unwrap() = Some(credential);
    }

    /// Remove the stored pair; idempotent
    pub fn clear(&self) {
        *self.inner.write().unwrap() = None;
    }

    /// True when a credential pair is present
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap().is_some()
    }
}
