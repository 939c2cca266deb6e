// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process session store.
//!
//! Used for local development (`SESSION_BACKEND=memory`) and tests. Rows and
//! accounts live in a shared [`MemoryBackend`]; each browser session gets a
//! [`MemorySession`] that tracks who is signed in. Individual operations can
//! be made to fail or lag, and every call is counted. Reads snapshot the
//! tables before any injected delay, so a slow read can return stale rows.

use super::events::{AuthEvent, AuthEvents, AuthSubscription};
use super::{SessionStore, SessionStoreFactory, SignUpOutcome, StoreError};
use crate::models::{Booking, Identity, NewProfile, Profile, UserMetadata};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store operations, for counting calls and injecting faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentIdentity,
    SignIn,
    SignUp,
    SignOut,
    FetchProfile,
    InsertProfile,
    FetchBookings,
}

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct MemoryInner {
    /// Accounts keyed by lowercase email
    accounts: DashMap<String, Account>,
    profiles: DashMap<String, Profile>,
    bookings: RwLock<Vec<Booking>>,
    failures: DashMap<Operation, String>,
    latency: DashMap<Operation, Duration>,
    calls: DashMap<Operation, usize>,
    next_user: AtomicU64,
}

/// Shared in-memory tables and accounts.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can sign in with email and password.
    pub fn add_account(&self, email: &str, password: &str, full_name: Option<&str>) -> Identity {
        let n = self.inner.next_user.fetch_add(1, Ordering::Relaxed) + 1;
        let identity = Identity {
            id: format!("user-{}", n),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
            },
        };
        self.inner.accounts.insert(
            email.to_lowercase(),
            Account {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        identity
    }

    pub fn put_profile(&self, profile: Profile) {
        self.inner.profiles.insert(profile.id.clone(), profile);
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.inner.profiles.get(id).map(|p| p.value().clone())
    }

    pub fn profile_count(&self) -> usize {
        self.inner.profiles.len()
    }

    pub fn add_booking(&self, booking: Booking) {
        self.inner.bookings.write().push(booking);
    }

    /// Make every later call to `op` fail with the given message.
    pub fn fail(&self, op: Operation, message: &str) {
        self.inner.failures.insert(op, message.to_string());
    }

    pub fn clear_failure(&self, op: Operation) {
        self.inner.failures.remove(&op);
    }

    /// Delay every later call to `op`.
    pub fn set_latency(&self, op: Operation, delay: Duration) {
        self.inner.latency.insert(op, delay);
    }

    pub fn clear_latency(&self, op: Operation) {
        self.inner.latency.remove(&op);
    }

    /// Number of times `op` has been called.
    pub fn calls(&self, op: Operation) -> usize {
        self.inner.calls.get(&op).map(|c| *c).unwrap_or(0)
    }

    /// Count the call, apply latency, then return any injected failure.
    async fn enter(&self, op: Operation) -> Result<(), StoreError> {
        *self.inner.calls.entry(op).or_insert(0) += 1;

        let delay = self.inner.latency.get(&op).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.inner.failures.get(&op) {
            Some(message) => Err(StoreError::Api {
                status: 500,
                message: message.value().clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SessionStoreFactory for MemoryBackend {
    fn open_session(&self) -> Arc<dyn SessionStore> {
        Arc::new(MemorySession::new(self.clone()))
    }
}

/// One visitor's session against a [`MemoryBackend`].
pub struct MemorySession {
    backend: MemoryBackend,
    current: RwLock<Option<Identity>>,
    events: AuthEvents,
}

impl MemorySession {
    pub fn new(backend: MemoryBackend) -> Self {
        Self {
            backend,
            current: RwLock::new(None),
            events: AuthEvents::new(),
        }
    }

    /// A session that is already signed in (as after a page reload).
    pub fn signed_in(backend: MemoryBackend, identity: Identity) -> Self {
        Self {
            backend,
            current: RwLock::new(Some(identity)),
            events: AuthEvents::new(),
        }
    }

    fn start_session(&self, identity: Identity) {
        *self.current.write() = Some(identity.clone());
        self.events.emit(AuthEvent::SignedIn(Some(identity)));
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn current_identity(&self) -> Result<Option<Identity>, StoreError> {
        self.backend.enter(Operation::CurrentIdentity).await?;
        Ok(self.current.read().clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, StoreError> {
        self.backend.enter(Operation::SignIn).await?;

        let identity = self
            .backend
            .inner
            .accounts
            .get(&email.to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.identity.clone())
            .ok_or(StoreError::InvalidCredentials)?;

        self.start_session(identity.clone());
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, StoreError> {
        self.backend.enter(Operation::SignUp).await?;

        if self
            .backend
            .inner
            .accounts
            .contains_key(&email.to_lowercase())
        {
            return Err(StoreError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let identity = self.backend.add_account(email, password, full_name);
        self.start_session(identity.clone());
        Ok(SignUpOutcome::SignedIn(identity))
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        self.backend.enter(Operation::SignOut).await?;
        *self.current.write() = None;
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.events.subscribe()
    }

    fn last_event_seq(&self) -> u64 {
        self.events.last_seq()
    }

    async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let snapshot = self.backend.profile(id);
        self.backend.enter(Operation::FetchProfile).await?;
        Ok(snapshot)
    }

    async fn insert_profile(&self, row: &NewProfile) -> Result<Profile, StoreError> {
        self.backend.enter(Operation::InsertProfile).await?;

        // Primary key constraint
        match self.backend.inner.profiles.entry(row.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Conflict),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let profile = Profile::from(row.clone());
                slot.insert(profile.clone());
                Ok(profile)
            }
        }
    }

    async fn fetch_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
        self.backend.enter(Operation::FetchBookings).await?;
        Ok(self
            .backend
            .inner
            .bookings
            .read()
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }
}
