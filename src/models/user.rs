//! User view-model assembled from identity, profile and bookings.

use super::{Booking, Identity, Profile};
use serde::Serialize;

/// Everything the pages need to know about the signed-in user.
///
/// Built fresh on every reconciliation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bookings: Vec<Booking>,
}

impl User {
    pub fn assemble(identity: &Identity, profile: Profile, bookings: Vec<Booking>) -> Self {
        Self {
            id: identity.id.clone(),
            name: profile.full_name,
            email: identity.email.clone().unwrap_or_default(),
            avatar: profile.avatar_url,
            bookings,
        }
    }

    /// First letter of the name, for the avatar placeholder.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}
