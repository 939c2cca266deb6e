// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Build the `User` view-model for an authenticated identity.
//!
//! Reads the profile and bookings concurrently, creating a default profile
//! the first time an identity is seen.

use super::ReconcileError;
use crate::models::{Identity, NewProfile, Profile, User};
use crate::store::{SessionStore, StoreError};
use crate::time_utils::format_utc_rfc3339;

/// Derive a complete `User` from an identity.
///
/// Performs at most one write (profile creation). Never retries.
pub async fn reconcile(store: &dyn SessionStore, identity: &Identity) -> Result<User, ReconcileError> {
    let (profile_result, bookings_result) = tokio::join!(
        store.fetch_profile(&identity.id),
        store.fetch_bookings(&identity.id),
    );

    let profile = match profile_result {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => Some(create_default_profile(store, identity).await?),
        Err(e) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Profile read failed");
            None
        }
    };
    let profile = profile.ok_or(ReconcileError::ProfileUnavailable)?;

    let bookings = bookings_result.unwrap_or_else(|e| {
        tracing::warn!(user_id = %identity.id, error = %e, "Bookings read failed, showing none");
        Vec::new()
    });

    tracing::debug!(
        user_id = %identity.id,
        bookings = bookings.len(),
        "User reconciled"
    );
    Ok(User::assemble(identity, profile, bookings))
}

/// Insert the default profile for a first-time identity.
///
/// A uniqueness conflict means another reconciliation won the race, so the
/// row is read back instead of failing.
async fn create_default_profile(
    store: &dyn SessionStore,
    identity: &Identity,
) -> Result<Profile, ReconcileError> {
    let row = NewProfile {
        id: identity.id.clone(),
        full_name: identity.default_display_name(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    match store.insert_profile(&row).await {
        Ok(profile) => Ok(profile),
        Err(StoreError::Conflict) => {
            tracing::info!(user_id = %identity.id, "Profile already exists, re-reading");
            match store.fetch_profile(&identity.id).await {
                Ok(Some(profile)) => Ok(profile),
                Ok(None) => Err(ReconcileError::ProfileCreationFailed(StoreError::Conflict)),
                Err(e) => Err(ReconcileError::ProfileCreationFailed(e)),
            }
        }
        Err(e) => Err(ReconcileError::ProfileCreationFailed(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus, GuestInfo, UserMetadata};
    use crate::store::{MemoryBackend, MemorySession, Operation};
    use std::time::Duration;

    fn identity(id: &str, email: &str, full_name: Option<&str>) -> Identity {
        Identity {
            id: id.to_string(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
            },
        }
    }

    fn booking(id: &str, user_id: &str) -> Booking {
        let check_in = chrono::Utc::now();
        Booking {
            id: id.to_string(),
            user_id: user_id.to_string(),
            hotel_id: "h1".to_string(),
            hotel_name: "Seaside Inn".to_string(),
            check_in,
            check_out: check_in + chrono::Duration::days(2),
            guests: GuestInfo::default(),
            total_price: 320.0,
            status: BookingStatus::Confirmed,
            booking_date: check_in,
            seasonal_discount: None,
            pet_fee: None,
        }
    }

    #[tokio::test]
    async fn test_first_visit_creates_one_profile() {
        let backend = MemoryBackend::new();
        let id = identity("u1", "ada@example.com", None);
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let user = reconcile(&session, &id).await.unwrap();

        assert_eq!(user.name, "ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(backend.calls(Operation::InsertProfile), 1);
        assert_eq!(backend.profile_count(), 1);
        assert_eq!(backend.profile("u1").unwrap().full_name, "ada");
    }

    #[tokio::test]
    async fn test_existing_profile_means_no_writes() {
        let backend = MemoryBackend::new();
        backend.put_profile(Profile {
            id: "u1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            avatar_url: Some("https://cdn.example.com/ada.png".to_string()),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        });
        let id = identity("u1", "ada@example.com", Some("Someone Else"));
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let user = reconcile(&session, &id).await.unwrap();

        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.avatar.as_deref(), Some("https://cdn.example.com/ada.png"));
        assert_eq!(backend.calls(Operation::InsertProfile), 0);
    }

    #[tokio::test]
    async fn test_bookings_filtered_by_user() {
        let backend = MemoryBackend::new();
        backend.add_booking(booking("b1", "u1"));
        backend.add_booking(booking("b2", "u1"));
        backend.add_booking(booking("b3", "u2"));
        let id = identity("u1", "ada@example.com", None);
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let user = reconcile(&session, &id).await.unwrap();
        assert_eq!(user.bookings.len(), 2);
        assert!(user.bookings.iter().all(|b| b.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_bookings_failure_yields_empty_list() {
        let backend = MemoryBackend::new();
        backend.add_booking(booking("b1", "u1"));
        backend.fail(Operation::FetchBookings, "relation unavailable");
        let id = identity("u1", "ada@example.com", None);
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let user = reconcile(&session, &id).await.unwrap();
        assert!(user.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_is_fatal() {
        let backend = MemoryBackend::new();
        backend.fail(Operation::InsertProfile, "permission denied");
        let id = identity("u1", "ada@example.com", None);
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let err = reconcile(&session, &id).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ProfileCreationFailed(_)));
    }

    #[tokio::test]
    async fn test_profile_read_failure_is_unavailable() {
        let backend = MemoryBackend::new();
        backend.fail(Operation::FetchProfile, "timeout");
        let id = identity("u1", "ada@example.com", None);
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let err = reconcile(&session, &id).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ProfileUnavailable));
        // A failed read must not trigger creation
        assert_eq!(backend.calls(Operation::InsertProfile), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_visits_create_single_profile() {
        let backend = MemoryBackend::new();
        // Both reads observe "no profile" before either insert lands
        backend.set_latency(Operation::FetchProfile, Duration::from_millis(20));
        let id = identity("u1", "ada@example.com", Some("Ada"));
        let session = MemorySession::signed_in(backend.clone(), id.clone());

        let (a, b) = tokio::join!(reconcile(&session, &id), reconcile(&session, &id));

        assert_eq!(a.unwrap().name, "Ada");
        assert_eq!(b.unwrap().name, "Ada");
        assert_eq!(backend.profile_count(), 1);
        // Both inserted; the loser hit the key conflict and re-read the row
        assert_eq!(backend.calls(Operation::InsertProfile), 2);
        assert_eq!(backend.calls(Operation::FetchProfile), 3);
    }
}
