// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live sessions keyed by the session cookie.

use super::{SessionController, SessionError};
use crate::store::{SessionStore, SessionStoreFactory};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use parking_lot::Mutex;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SESSION_ID_BYTES: usize = 32;

/// One visitor: their controller plus the little view state pages share.
pub struct Session {
    id: String,
    controller: SessionController,
    show_auth: AtomicBool,
    last_seen: Mutex<Instant>,
}

impl Session {
    fn new(id: String, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id,
            controller: SessionController::start(store),
            show_auth: AtomicBool::new(false),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        self.controller.store()
    }

    /// Whether the auth modal is open.
    pub fn show_auth(&self) -> bool {
        self.show_auth.load(Ordering::Relaxed)
    }

    pub fn set_show_auth(&self, visible: bool) {
        self.show_auth.store(visible, Ordering::Relaxed);
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

/// All live sessions for this process.
pub struct SessionRegistry {
    factory: Arc<dyn SessionStoreFactory>,
    sessions: DashMap<String, Arc<Session>>,
    rng: SystemRandom,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn SessionStoreFactory>) -> Self {
        Self {
            factory,
            sessions: DashMap::new(),
            rng: SystemRandom::new(),
        }
    }

    /// Look up a session and mark it as seen.
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.get(id).map(|s| s.value().clone())?;
        session.touch();
        Some(session)
    }

    /// Open a new signed-out session with a fresh store handle.
    pub fn create(&self) -> Result<Arc<Session>, SessionError> {
        let store = self.factory.open_session();
        self.insert(store)
    }

    /// Register a session around an existing store handle.
    pub fn insert(&self, store: Arc<dyn SessionStore>) -> Result<Arc<Session>, SessionError> {
        let id = self.generate_id()?;
        let session = Arc::new(Session::new(id.clone(), store));
        self.sessions.insert(id, session.clone());
        tracing::debug!(sessions = self.sessions.len(), "Session created");
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions not seen for `max_idle`. Returns how many were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.idle_for() < max_idle);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    fn generate_id(&self) -> Result<String, SessionError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| SessionError::IdGeneration)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let registry = registry();
        let session = registry.create().unwrap();

        assert_eq!(session.id().len(), 43); // 32 bytes, base64url without padding
        let found = registry.get(session.id()).unwrap();
        assert!(Arc::ptr_eq(&session, &found));
        assert!(registry.get("nope").is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry = registry();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let registry = registry();
        registry.create().unwrap();
        assert_eq!(registry.evict_idle(Duration::from_secs(3600)), 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(registry.evict_idle(Duration::from_millis(1)), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_auth_modal_flag() {
        let registry = registry();
        let session = registry.create().unwrap();
        assert!(!session.show_auth());
        session.set_show_auth(true);
        assert!(session.show_auth());
    }
}
