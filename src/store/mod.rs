// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the managed auth/database service behind the app.
//!
//! Every browser session gets its own [`SessionStore`] handle (it holds
//! that visitor's auth tokens), opened from a shared [`SessionStoreFactory`].
//! - [`supabase`] talks to GoTrue and PostgREST over HTTPS
//! - [`memory`] keeps everything in process (local development, tests)

pub mod events;
pub mod memory;
pub mod supabase;

pub use events::{AuthEvent, AuthEvents, AuthStateChange, AuthSubscription, Delivery};
pub use memory::{MemoryBackend, MemorySession, Operation};
pub use supabase::{SupabaseClient, SupabaseSession};

use crate::models::{Booking, Identity, NewProfile, Profile};
use async_trait::async_trait;
use std::sync::Arc;

/// Relation names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const BOOKINGS: &str = "bookings";
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Account created and a session started (emits `SignedIn`).
    SignedIn(Identity),
    /// Account created; the user must confirm their email first.
    ConfirmationRequired,
}

/// One visitor's connection to the managed service.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Identity for the current session, if signed in.
    async fn current_identity(&self) -> Result<Option<Identity>, StoreError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, StoreError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, StoreError>;

    /// End the session. Emits `SignedOut` on success.
    async fn sign_out(&self) -> Result<(), StoreError>;

    /// Subscribe to auth-state changes for this session.
    fn subscribe(&self) -> AuthSubscription;

    /// Sequence number of the most recently emitted auth event.
    fn last_event_seq(&self) -> u64;

    /// Read the profile row keyed by identity ID.
    async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, StoreError>;

    /// Insert a profile row, returning the stored representation.
    ///
    /// Fails with [`StoreError::Conflict`] if the row already exists.
    async fn insert_profile(&self, row: &NewProfile) -> Result<Profile, StoreError>;

    async fn fetch_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError>;
}

/// Opens a fresh, signed-out store handle per browser session.
pub trait SessionStoreFactory: Send + Sync {
    fn open_session(&self) -> Arc<dyn SessionStore>;
}

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Row already exists")]
    Conflict,

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,
}
