//! User profile record.
//!
//! Separate from the identity service account: the profile lives in the
//! synced store and carries the display data chosen at sign-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bandmerch_core::{Email, ItemId, UserRole};

use crate::services::sync::Record;

/// A user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: ItemId,
    /// Normalized (trimmed, lowercased) email address.
    pub email: Email,
    pub role: UserRole,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// New profile awaiting an id from the store.
    #[must_use]
    pub fn new(email: Email, username: &str, role: UserRole) -> Self {
        let username = username.trim();
        Self {
            id: ItemId::new(""),
            email,
            role,
            username: (!username.is_empty()).then(|| username.to_string()),
            profile_picture: None,
            bio: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Record for UserProfile {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn assign_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}
