//! Like record from the `likes` collection, unique per (user, post).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, Post, User, timestamp};

/// Collection name for likes.
pub const LIKES: &str = "likes";

/// Like record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    pub user: String,
    pub post: String,
    #[serde(default)]
    pub read: bool,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<LikeExpand>,
}

/// Relations expanded on a like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LikeExpand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl Like {
    pub fn liker(&self) -> Option<&User> {
        self.expand.as_ref().and_then(|e| e.user.as_ref())
    }

    pub fn liked_post(&self) -> Option<&Post> {
        self.expand.as_ref().and_then(|e| e.post.as_ref())
    }
}

impl HasId for Like {
    fn id(&self) -> &str {
        &self.id
    }
}
