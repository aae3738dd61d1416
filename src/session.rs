//! Session lifecycle and claims-derived queries.
//!
//! [`SessionManager`] owns logout: it clears the credential store and sends
//! the host application to its login entry point through [`SessionEvents`].
//! It also answers the role/permission queries the UI's gating layer
//! consumes, decoded from the access token's claims segment.

use crate::credentials::{Credential, CredentialStore};
use crate::models::TokenClaims;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Type alias for the logout callback.
pub type OnLogoutCallback = Arc<dyn Fn() + Send + Sync>;

/// Type alias for the refreshed-credential callback.
pub type OnRefreshedCallback = Arc<dyn Fn(&Credential) + Send + Sync>;

/// Host application hooks for session lifecycle events.
///
/// # Example
///
/// ```rust,no_run
/// use staff_link::{SessionEvents, StaffLinkClient};
///
/// # fn example() -> staff_link::Result<()> {
/// let events = SessionEvents::new()
///     .on_logout(|| {
///         // navigate to the login route
///     })
///     .on_refreshed(|credential| {
///         // persist the rotated pair to session storage
///         let _ = credential;
///     });
///
/// let client = StaffLinkClient::builder()
///     .base_url("https://hr.example.com")
///     .events(events)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct SessionEvents {
    on_logout: Option<OnLogoutCallback>,
    on_refreshed: Option<OnRefreshedCallback>,
}

impl SessionEvents {
    /// Create an empty set of handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once when the session ends (explicit logout or failed refresh);
    /// the host should navigate to its login route.
    pub fn on_logout<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_logout = Some(Arc::new(callback));
        self
    }

    /// Fired after a successful token refresh with the new pair; the host
    /// can persist it to its session-scoped storage.
    pub fn on_refreshed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Credential) + Send + Sync + 'static,
    {
        self.on_refreshed = Some(Arc::new(callback));
        self
    }

    pub(crate) fn emit_logout(&self) {
        if let Some(callback) = &self.on_logout {
            callback();
        }
    }

    pub(crate) fn emit_refreshed(&self, credential: &Credential) {
        if let Some(callback) = &self.on_refreshed {
            callback(credential);
        }
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("on_logout", &self.on_logout.is_some())
            .field("on_refreshed", &self.on_refreshed.is_some())
            .finish()
    }
}

/// Owns session teardown and the claims-derived query surface.
///
/// This is the only component that clears credentials outside of a failed
/// refresh settlement.
#[derive(Clone)]
pub struct SessionManager {
    store: CredentialStore,
    events: SessionEvents,
    /// Set once the logout side effect has fired; re-armed by a new login.
    navigated: Arc<AtomicBool>,
}

impl SessionManager {
    pub(crate) fn new(store: CredentialStore, events: SessionEvents) -> Self {
        Self {
            store,
            events,
            navigated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Install a fresh credential after a successful login and re-arm the
    /// logout side effect.
    pub(crate) fn establish(&self, credential: Credential) {
        self.store.set(credential);
        self.navigated.store(false, Ordering::SeqCst);
        debug!("[SESSION] Session established");
    }

    /// Clear the session and send the host to its login entry point.
    ///
    /// Idempotent: repeat calls keep the store clear but fire the
    /// navigation hook only once per session.
    pub fn logout(&self) {
        self.store.clear();
        if !self.navigated.swap(true, Ordering::SeqCst) {
            debug!("[SESSION] Logged out, notifying host");
            self.events.emit_logout();
        }
    }

    /// True when a credential pair is present.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Claims decoded from the current access token, if any.
    pub fn claims(&self) -> Option<TokenClaims> {
        let credential = self.store.get()?;
        decode_claims(&credential.access_token)
    }

    /// True when the current user holds any of the listed roles.
    pub fn has_role(&self, roles: &[&str]) -> bool {
        match self.claims() {
            Some(claims) => roles
                .iter()
                .any(|role| claims.roles.iter().any(|held| held == role)),
            None => false,
        }
    }

    /// True when the current user holds any of the listed permissions.
    pub fn has_permission(&self, permissions: &[&str]) -> bool {
        match self.claims() {
            Some(claims) => permissions
                .iter()
                .any(|permission| claims.permissions.iter().any(|held| held == permission)),
            None => false,
        }
    }

    /// Access check for a guarded action: any listed role or any listed
    /// permission grants (logical OR across both sets).
    pub fn is_granted(&self, roles: &[&str], permissions: &[&str]) -> bool {
        self.has_role(roles) || self.has_permission(permissions)
    }
}

/// Decode the claims segment of a JWT without verifying the signature.
///
/// The server validates every request; the client only reads the claims to
/// drive UI gating.
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("[SESSION] Failed to decode token claims segment: {}", err);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(err) => {
            warn!("[SESSION] Failed to parse token claims: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Unsigned token with the given claims JSON as its middle segment.
    fn token_with_claims(claims_json: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims_json.as_bytes());
        format!("{}.{}.sig", header, payload)
    }

    fn manager_with_token(claims_json: &str) -> SessionManager {
        let store = CredentialStore::new();
        store.set(Credential::new(token_with_claims(claims_json), "refresh"));
        SessionManager::new(store, SessionEvents::new())
    }

    #[test]
    fn test_unauthenticated_has_nothing() {
        let manager = SessionManager::new(CredentialStore::new(), SessionEvents::new());
        assert!(!manager.is_authenticated());
        assert!(manager.claims().is_none());
        assert!(!manager.has_role(&["Admin"]));
        assert!(!manager.is_granted(&["Admin"], &["files.read"]));
    }

    #[test]
    fn test_role_and_permission_queries() {
        let manager =
            manager_with_token(r#"{"sub":"u1","roles":["HR","Manager"],"permissions":["files.read"]}"#);

        assert!(manager.is_authenticated());
        assert!(manager.has_role(&["Admin", "HR"]));
        assert!(!manager.has_role(&["Admin"]));
        assert!(manager.has_permission(&["files.read"]));
        assert!(!manager.has_permission(&["files.write"]));

        // OR across both sets: a permission match grants even with no role match
        assert!(manager.is_granted(&["Admin"], &["files.read"]));
        assert!(!manager.is_granted(&["Admin"], &["files.write"]));
    }

    #[test]
    fn test_malformed_token_yields_no_claims() {
        let store = CredentialStore::new();
        store.set(Credential::new("not-a-jwt", "refresh"));
        let manager = SessionManager::new(store, SessionEvents::new());
        assert!(manager.claims().is_none());
        assert!(!manager.has_role(&["Admin"]));
    }

    #[test]
    fn test_logout_clears_and_notifies_once() {
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = notifications.clone();
        let store = CredentialStore::new();
        store.set(Credential::new("access", "refresh"));
        let manager = SessionManager::new(
            store.clone(),
            SessionEvents::new().on_logout(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        manager.logout();
        assert!(!store.is_authenticated());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        // Second call keeps the store clear without a duplicate navigation
        manager.logout();
        assert!(!store.is_authenticated());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_new_session_rearms_logout_notification() {
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = notifications.clone();
        let store = CredentialStore::new();
        let manager = SessionManager::new(
            store,
            SessionEvents::new().on_logout(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        manager.logout();
        manager.establish(Credential::new("access-2", "refresh-2"));
        manager.logout();
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }
}
