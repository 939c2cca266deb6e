// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated identity as issued by the session store.

use serde::{Deserialize, Serialize};

/// Externally authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Store-issued user ID (also the profile row key)
    pub id: String,
    /// Email address (may be absent for phone/OAuth-only accounts)
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form metadata attached at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Identity {
    /// Display name for a freshly created profile.
    ///
    /// Metadata name first, then the local part of the email, then "User".
    pub fn default_display_name(&self) -> String {
        let from_metadata = self
            .user_metadata
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let from_email = self
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty());

        from_metadata
            .or(from_email)
            .unwrap_or("User")
            .to_string()
    }
}
