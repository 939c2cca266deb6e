// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session controller: owns the reconciliation lifecycle for one visitor.
//!
//! - On start, reconciles the current identity (if any)
//! - Re-reconciles on `SignedIn`, clears state and navigates home on `SignedOut`
//! - Every reconciliation takes a token; results from superseded attempts
//!   (or attempts overtaken by a sign-out) are discarded
//! - Dropping the controller stops its tasks and releases the subscription

use super::reconciler::reconcile;
use super::{Notification, Notifier, SessionError, SessionState};
use crate::models::Identity;
use crate::store::{AuthEvent, AuthSubscription, Delivery, SessionStore};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const PROFILE_LOAD_FAILED: &str = "Failed to load user profile. Please try signing in again.";
pub const SIGNED_OUT: &str = "Signed out successfully";
pub const SIGN_OUT_FAILED: &str = "Failed to sign out";

/// Route the view is sent to after sign-out.
const HOME_ROUTE: &str = "/";

struct ControllerInner {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    /// Sequence number of the last auth event fully handled
    handled: watch::Sender<u64>,
    /// Token of the newest reconciliation; state writes happen under this lock
    latest: Mutex<u64>,
    notifier: Notifier,
    redirect: Mutex<Option<String>>,
}

/// Drives one visitor's session state.
pub struct SessionController {
    inner: Arc<ControllerInner>,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionController {
    /// Subscribe to the store's auth events and start the initial
    /// reconciliation. Must be called from within a Tokio runtime.
    pub fn start(store: Arc<dyn SessionStore>) -> Self {
        let subscription = store.subscribe();
        let (state, _) = watch::channel(SessionState::Loading);
        let (handled, _) = watch::channel(store.last_event_seq());

        let inner = Arc::new(ControllerInner {
            store,
            state,
            handled,
            latest: Mutex::new(0),
            notifier: Notifier::default(),
            redirect: Mutex::new(None),
        });

        let mount = tokio::spawn({
            let inner = inner.clone();
            async move { inner.check_user().await }
        });
        let listener = tokio::spawn(listen(inner.clone(), subscription));

        Self {
            inner,
            tasks: vec![mount, listener],
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Wait until the state is no longer `Loading` and every auth event
    /// emitted so far has been handled.
    pub async fn settled(&self) {
        let mut state_rx = self.inner.state.subscribe();
        // The sender lives in `inner`, which we hold, so this cannot fail
        let _ = state_rx.wait_for(|s| !s.is_loading()).await;

        // Handling an event can emit another (forced sign-out), so re-check
        let mut handled_rx = self.inner.handled.subscribe();
        loop {
            let target = self.inner.store.last_event_seq();
            let _ = handled_rx.wait_for(|seq| *seq >= target).await;
            if self.inner.store.last_event_seq() == target {
                break;
            }
        }
    }

    /// Sign out through the store.
    ///
    /// State is left to the `SignedOut` event that a successful sign-out emits.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        match self.inner.store.sign_out().await {
            Ok(()) => {
                tracing::info!("User signed out");
                self.inner.notifier.success(SIGNED_OUT);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Sign-out failed");
                self.inner.notifier.error(SIGN_OUT_FAILED);
                Err(SessionError::SignOutFailed(e))
            }
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Take all pending notifications.
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.inner.notifier.drain()
    }

    /// Take the pending navigation target, if any.
    pub fn take_redirect(&self) -> Option<String> {
        self.inner.redirect.lock().take()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Aborting the listener drops its subscription
        for task in &self.tasks {
            task.abort();
        }
        tracing::debug!("Session controller torn down");
    }
}

impl ControllerInner {
    /// Start a new reconciliation attempt, superseding older ones.
    fn next_token(&self) -> u64 {
        let mut latest = self.latest.lock();
        *latest += 1;
        *latest
    }

    fn is_current(&self, token: u64) -> bool {
        *self.latest.lock() == token
    }

    /// Write state if `token` is still the newest attempt.
    fn apply(&self, token: u64, state: SessionState) -> bool {
        let latest = self.latest.lock();
        if *latest != token {
            tracing::debug!(token, latest = *latest, "Discarding stale session result");
            return false;
        }
        self.state.send_replace(state);
        true
    }

    fn mark_handled(&self, seq: u64) {
        self.handled.send_if_modified(|handled| {
            if seq > *handled {
                *handled = seq;
                true
            } else {
                false
            }
        });
    }

    /// Look up the current identity and reconcile it.
    async fn check_user(&self) {
        let token = self.next_token();

        let identity = match self.store.current_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                self.apply(token, SessionState::Unauthenticated);
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch current identity");
                self.apply(token, SessionState::Unauthenticated);
                return;
            }
        };

        self.reconcile_identity(token, identity).await;
    }

    async fn reconcile_identity(&self, token: u64, identity: Identity) {
        match reconcile(self.store.as_ref(), &identity).await {
            Ok(user) => {
                let user_id = user.id.clone();
                if self.apply(token, SessionState::Authenticated(user)) {
                    tracing::info!(user_id = %user_id, "Session authenticated");
                }
            }
            Err(e) if !self.is_current(token) => {
                tracing::warn!(user_id = %identity.id, error = %e, "Superseded reconciliation failed");
            }
            Err(e) => {
                tracing::error!(user_id = %identity.id, error = %e, "Error reconciling user session");
                self.notifier.error(PROFILE_LOAD_FAILED);

                // Never keep operating on a partially loaded identity
                if let Err(e) = self.store.sign_out().await {
                    tracing::error!(error = %e, "Forced sign-out failed");
                }
                self.apply(token, SessionState::Unauthenticated);
            }
        }
    }

    async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(Some(_)) => self.check_user().await,
            AuthEvent::SignedIn(None) => {
                tracing::debug!("Signed-in event without a session user, ignoring");
            }
            AuthEvent::SignedOut => {
                // Supersede anything in flight, then clear
                let token = self.next_token();
                self.apply(token, SessionState::Unauthenticated);
                *self.redirect.lock() = Some(HOME_ROUTE.to_string());
                tracing::info!("Session signed out");
            }
        }
    }
}

/// Handle auth events one at a time until the source goes away.
async fn listen(inner: Arc<ControllerInner>, mut subscription: AuthSubscription) {
    while let Some(delivery) = subscription.next().await {
        match delivery {
            Delivery::Event(change) => {
                inner.handle_event(change.event).await;
                inner.mark_handled(change.seq);
            }
            Delivery::Missed(count) => {
                tracing::warn!(count, "Missed auth events, re-checking session");
                let seen = inner.store.last_event_seq();
                inner.check_user().await;
                inner.mark_handled(seen);
            }
        }
    }

    inner.mark_handled(u64::MAX);
    subscription.unsubscribe();
}
