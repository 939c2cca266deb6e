//! Profile rows stored in the `profiles` relation.

use serde::{Deserialize, Serialize};

/// Persisted profile, one per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity ID (primary key)
    pub id: String,
    pub full_name: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// When the profile was created (ISO 8601)
    pub created_at: String,
}

/// Row inserted when an identity has no profile yet.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub full_name: String,
    pub created_at: String,
}

impl From<NewProfile> for Profile {
    fn from(row: NewProfile) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            avatar_url: None,
            created_at: row.created_at,
        }
    }
}
