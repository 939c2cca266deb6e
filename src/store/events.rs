// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth-state change notifications.

use crate::models::Identity;
use parking_lot::Mutex;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A session started. Carries the session user when the store knows it.
    SignedIn(Option<Identity>),
    SignedOut,
}

/// An event tagged with its per-session sequence number.
#[derive(Debug, Clone)]
pub struct AuthStateChange {
    pub seq: u64,
    pub event: AuthEvent,
}

/// Event source owned by a store session.
pub struct AuthEvents {
    tx: broadcast::Sender<AuthStateChange>,
    // Guards sequence assignment so events are sent in seq order
    seq: Mutex<u64>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tx,
            seq: Mutex::new(0),
        }
    }

    /// Publish an event, returning its sequence number.
    pub fn emit(&self, event: AuthEvent) -> u64 {
        let mut seq = self.seq.lock();
        *seq += 1;
        let change = AuthStateChange { seq: *seq, event };
        tracing::debug!(seq = change.seq, event = ?change.event, "Auth state change");
        // No receivers just means nobody is listening yet
        let _ = self.tx.send(change);
        *seq
    }

    pub fn last_seq(&self) -> u64 {
        *self.seq.lock()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// What a subscriber sees next.
#[derive(Debug)]
pub enum Delivery {
    Event(AuthStateChange),
    /// The subscriber fell behind and this many events were dropped.
    Missed(u64),
}

/// Live subscription to auth-state changes. Dropping it unsubscribes.
pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthStateChange>,
}

impl AuthSubscription {
    /// Wait for the next event. Returns `None` once the source is gone.
    pub async fn next(&mut self) -> Option<Delivery> {
        match self.rx.recv().await {
            Ok(change) => Some(Delivery::Event(change)),
            Err(broadcast::error::RecvError::Lagged(n)) => Some(Delivery::Missed(n)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Explicitly release the subscription.
    pub fn unsubscribe(self) {
        tracing::debug!("Auth subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_sequence() {
        let events = AuthEvents::new();
        let mut sub = events.subscribe();

        assert_eq!(events.emit(AuthEvent::SignedIn(None)), 1);
        assert_eq!(events.emit(AuthEvent::SignedOut), 2);
        assert_eq!(events.last_seq(), 2);

        match sub.next().await {
            Some(Delivery::Event(c)) => {
                assert_eq!(c.seq, 1);
                assert_eq!(c.event, AuthEvent::SignedIn(None));
            }
            other => panic!("unexpected delivery: {:?}", other),
        }
        match sub.next().await {
            Some(Delivery::Event(c)) => assert_eq!(c.event, AuthEvent::SignedOut),
            other => panic!("unexpected delivery: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_still_counts() {
        let events = AuthEvents::new();
        events.emit(AuthEvent::SignedOut);
        assert_eq!(events.last_seq(), 1);
    }

    #[tokio::test]
    async fn test_source_dropped_ends_subscription() {
        let events = AuthEvents::new();
        let mut sub = events.subscribe();
        drop(events);
        assert!(sub.next().await.is_none());
    }
}
