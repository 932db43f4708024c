//! Follow record from the `follows` collection.
//!
//! A follow is an edge from `follower` to `following`. It starts pending
//! (`accepted = false`) and becomes visible as a "started following you"
//! notification once accepted. `read` tracks notification state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, User, timestamp};

/// Collection name for follows.
pub const FOLLOWS: &str = "follows";

/// Follow record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    pub follower: String,
    pub following: String,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<FollowExpand>,
}

/// Relations expanded on a follow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowExpand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<User>,
}

impl Follow {
    pub fn is_pending(&self) -> bool {
        !self.accepted
    }

    pub fn follower_user(&self) -> Option<&User> {
        self.expand.as_ref().and_then(|e| e.follower.as_ref())
    }

    pub fn following_user(&self) -> Option<&User> {
        self.expand.as_ref().and_then(|e| e.following.as_ref())
    }
}

impl HasId for Follow {
    fn id(&self) -> &str {
        &self.id
    }
}
