// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-visitor session: reconciliation, auth-state handling, view state.

pub mod controller;
pub mod reconciler;
pub mod registry;

pub use controller::SessionController;
pub use reconciler::reconcile;
pub use registry::{Session, SessionRegistry};

use crate::models::User;
use crate::store::StoreError;
use parking_lot::Mutex;

/// Where the visitor stands with respect to authentication.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
        }
    }
}

/// Transient message shown to the user on the next page view.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Queue of pending notifications for one session.
#[derive(Default)]
pub struct Notifier {
    queue: Mutex<Vec<Notification>>,
}

impl Notifier {
    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message.into());
    }

    fn push(&self, level: NotificationLevel, message: String) {
        self.queue.lock().push(Notification { level, message });
    }

    /// Take all pending notifications, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Pending notifications without consuming them.
    pub fn pending(&self) -> Vec<Notification> {
        self.queue.lock().clone()
    }
}

/// Reconciliation failures. Both end the session.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Failed to create profile: {0}")]
    ProfileCreationFailed(#[source] StoreError),

    #[error("Failed to load or create user profile")]
    ProfileUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to sign out: {0}")]
    SignOutFailed(#[source] StoreError),

    #[error("Failed to generate session ID")]
    IdGeneration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_drains_in_order() {
        let notifier = Notifier::default();
        notifier.error("first");
        notifier.success("second");

        assert_eq!(notifier.pending().len(), 2);
        let drained = notifier.drain();
        assert_eq!(drained[0].level, NotificationLevel::Error);
        assert_eq!(drained[1].message, "second");
        assert!(notifier.drain().is_empty());
    }
}
