//! Single-flight token refresh coordination.
//!
//! When many in-flight requests discover an expired access token at the same
//! time, exactly one refresh exchange goes out. The first caller to find the
//! coordinator idle becomes the leader and performs the network call; every
//! later caller registers a waiter and suspends. When the leader settles,
//! the new pair is stored first, then all waiters are resolved in FIFO
//! registration order. A failed (or timed-out) refresh rejects every waiter
//! with the same normalized error and clears the credential store; a failed
//! exchange means the refresh token itself is no longer good.

use crate::credentials::{Credential, CredentialStore};
use crate::error::{Result, StaffLinkError};
use crate::models::{ApiError, RefreshRequest};
use crate::normalize;
use crate::pipeline::RequestBody;
use crate::session::SessionEvents;
use crate::transport::{HttpTransport, TransportRequest};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

/// Performs the actual credential exchange.
///
/// Split out as a trait so the coordinator's queueing semantics can be
/// exercised without a network stack.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange the current pair for a fresh one.
    async fn refresh(&self, current: Credential) -> Result<Credential>;
}

/// Production refresher: posts the current pair to the refresh endpoint.
///
/// Goes straight to the transport, never through the request pipeline, so a
/// rejected refresh can not recurse into the coordinator.
pub struct HttpTokenRefresher {
    transport: Arc<dyn HttpTransport>,
    refresh_url: String,
}

impl HttpTokenRefresher {
    pub fn new(transport: Arc<dyn HttpTransport>, refresh_url: String) -> Self {
        Self {
            transport,
            refresh_url,
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, current: Credential) -> Result<Credential> {
        let body = serde_json::to_value(RefreshRequest::from(&current))
            .map_err(|e| StaffLinkError::SerializationError(e.to_string()))?;
        let request = TransportRequest {
            method: crate::models::HttpMethod::Post,
            url: self.refresh_url.clone(),
            headers: Vec::new(),
            body: RequestBody::Json(body),
        };

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(normalize::error_from_response(&response));
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| StaffLinkError::SerializationError(e.to_string()))
    }
}

/// One queued caller's paused execution; resolved or rejected exactly once.
type Waiter = oneshot::Sender<Result<Credential>>;

/// Refresh progress. At most one refresh is outstanding process-wide.
enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// Guarantees single-flight refresh semantics.
///
/// Callers (leader and followers alike) invoke
/// [`obtain_fresh_credential`](RefreshCoordinator::obtain_fresh_credential)
/// and receive the new credential or the shared failure; no caller knows or
/// cares which role it played.
pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    store: CredentialStore,
    events: SessionEvents,
    refresh_timeout: Duration,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        refresher: Arc<dyn TokenRefresher>,
        store: CredentialStore,
        events: SessionEvents,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            refresher,
            store,
            events,
            refresh_timeout,
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// Obtain a fresh credential, joining an in-flight refresh if one is
    /// already running.
    pub async fn obtain_fresh_credential(&self) -> Result<Credential> {
        // Check-and-set under the lock: the first caller to find the state
        // idle becomes the leader, everyone else registers a waiter. The
        // lock is released before any await.
        let waiter = {
            let mut state = self.state.lock().unwrap();
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    debug!("[REFRESH] Refresh in flight, queued waiter #{}", waiters.len());
                    Some(rx)
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing {
                        waiters: Vec::new(),
                    };
                    None
                }
            }
        };

        match waiter {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(StaffLinkError::AuthenticationError(ApiError::new(
                    0,
                    "Session refresh failed",
                    "refresh was abandoned before settling",
                )))
            }),
            None => self.lead_refresh().await,
        }
    }

    /// Run the exchange as leader and broadcast the outcome.
    async fn lead_refresh(&self) -> Result<Credential> {
        let outcome = self.run_refresh().await;

        // Publish before waking anyone so every replay sees the new pair.
        match &outcome {
            Ok(credential) => {
                self.store.set(credential.clone());
                self.events.emit_refreshed(credential);
                debug!("[REFRESH] Token refresh succeeded");
            }
            Err(err) => {
                self.store.clear();
                warn!("[REFRESH] Token refresh failed: {}", err);
            }
        }

        let waiters = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        // FIFO broadcast in registration order.
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    async fn run_refresh(&self) -> Result<Credential> {
        let current = match self.store.get() {
            Some(credential) if credential.has_refresh_token() => credential,
            // Nothing to exchange: fail without a network call.
            _ => {
                return Err(StaffLinkError::AuthenticationError(ApiError::new(
                    401,
                    "Unauthorized",
                    "no refresh credential available",
                )))
            }
        };

        debug!("[REFRESH] Starting token refresh");
        match timeout(self.refresh_timeout, self.refresher.refresh(current)).await {
            Ok(result) => result,
            Err(_) => Err(StaffLinkError::AuthenticationError(ApiError::new(
                0,
                "Refresh timed out",
                format!("no refresh response within {:?}", self.refresh_timeout),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Refresher that counts calls and can be held in flight until released.
    struct ControlledRefresher {
        calls: AtomicUsize,
        release: Notify,
        hold: bool,
        outcome: Box<dyn Fn() -> Result<Credential> + Send + Sync>,
    }

    impl ControlledRefresher {
        fn succeeding(hold: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
                hold,
                outcome: Box::new(|| Ok(Credential::new("new-access", "new-refresh"))),
            })
        }

        fn failing(hold: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
                hold,
                outcome: Box::new(|| {
                    Err(StaffLinkError::AuthenticationError(ApiError::new(
                        401,
                        "Unauthorized",
                        "refresh token revoked",
                    )))
                }),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for ControlledRefresher {
        async fn refresh(&self, _current: Credential) -> Result<Credential> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hold {
                self.release.notified().await;
            }
            (self.outcome)()
        }
    }

    fn coordinator(
        refresher: Arc<ControlledRefresher>,
        store: &CredentialStore,
    ) -> Arc<RefreshCoordinator> {
        Arc::new(RefreshCoordinator::new(
            refresher,
            store.clone(),
            SessionEvents::new(),
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_single_caller_refreshes_and_stores() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let refresher = ControlledRefresher::succeeding(false);
        let coordinator = coordinator(refresher.clone(), &store);

        let credential = coordinator.obtain_fresh_credential().await.unwrap();
        assert_eq!(credential.access_token, "new-access");
        assert_eq!(store.get().unwrap().access_token, "new-access");
        assert_eq!(refresher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let refresher = ControlledRefresher::succeeding(true);
        let coordinator = coordinator(refresher.clone(), &store);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator.obtain_fresh_credential().await
            }));
            // Let the spawned task reach the coordinator before the next one
            tokio::task::yield_now().await;
        }

        refresher.release.notify_one();
        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap().access_token);
        }

        assert_eq!(refresher.call_count(), 1);
        assert!(tokens.iter().all(|token| token == "new-access"));
    }

    #[tokio::test]
    async fn test_followers_settle_in_registration_order() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let refresher = ControlledRefresher::succeeding(true);
        let coordinator = coordinator(refresher.clone(), &store);

        // Leader occupies the coordinator first
        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.obtain_fresh_credential().await })
        };
        tokio::task::yield_now().await;

        let settled = Arc::new(Mutex::new(Vec::new()));
        let mut followers = Vec::new();
        for index in 0..3 {
            let coordinator = coordinator.clone();
            let settled = settled.clone();
            followers.push(tokio::spawn(async move {
                let result = coordinator.obtain_fresh_credential().await;
                settled.lock().unwrap().push(index);
                result
            }));
            tokio::task::yield_now().await;
        }

        refresher.release.notify_one();
        leader.await.unwrap().unwrap();
        for follower in followers {
            follower.await.unwrap().unwrap();
        }

        assert_eq!(*settled.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_failure_fans_out_and_clears_store() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let refresher = ControlledRefresher::failing(true);
        let coordinator = coordinator(refresher.clone(), &store);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator.obtain_fresh_credential().await
            }));
            tokio::task::yield_now().await;
        }

        refresher.release.notify_one();
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(err.is_authentication());
            assert_eq!(err.details().messages, vec!["refresh token revoked"]);
        }

        assert_eq!(refresher.call_count(), 1);
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_network_call() {
        let store = CredentialStore::new();
        let refresher = ControlledRefresher::succeeding(false);
        let coordinator = coordinator(refresher.clone(), &store);

        let err = coordinator.obtain_fresh_credential().await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_coordinator_is_reusable_after_settlement() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let refresher = ControlledRefresher::succeeding(false);
        let coordinator = coordinator(refresher.clone(), &store);

        coordinator.obtain_fresh_credential().await.unwrap();
        coordinator.obtain_fresh_credential().await.unwrap();
        assert_eq!(refresher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_timeout_rejects_like_failure() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        // Held refresher that is never released: only the timer can settle it
        let refresher = ControlledRefresher::succeeding(true);
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher.clone(),
            store.clone(),
            SessionEvents::new(),
            Duration::from_secs(1),
        ));

        let err = coordinator.obtain_fresh_credential().await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.details().title, "Refresh timed out");
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_refreshed_event_fires_with_new_pair() {
        let store = CredentialStore::new();
        store.set(Credential::new("stale", "refresh"));
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let events = SessionEvents::new().on_refreshed(move |credential: &Credential| {
            *sink.lock().unwrap() = Some(credential.clone());
        });
        let refresher = ControlledRefresher::succeeding(false);
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher,
            store.clone(),
            events,
            Duration::from_secs(5),
        ));

        coordinator.obtain_fresh_credential().await.unwrap();
        assert_eq!(
            seen.lock().unwrap().as_ref().unwrap().access_token,
            "new-access"
        );
    }
}
