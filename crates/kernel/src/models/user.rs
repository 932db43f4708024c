//! User record from the `users` auth collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, timestamp};

/// Collection name for users.
pub const USERS: &str = "users";

/// User record.
///
/// `email` is hidden by the backend for everyone but the owner, so it is
/// optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar file name, empty when unset.
    #[serde(default)]
    pub avatar: String,
    /// Public profiles expose their posts to everyone.
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    pub fn has_avatar(&self) -> bool {
        !self.avatar.is_empty()
    }
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }
}
