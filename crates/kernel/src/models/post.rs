//! Post record from the `posts` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, User, timestamp};

/// Collection name for posts.
pub const POSTS: &str = "posts";

/// Post record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    /// Author user id.
    pub user: String,
    /// Image file names; the first one is used for thumbnails.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<PostExpand>,
}

/// Relations expanded on a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostExpand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Post {
    /// The expanded author, when the query asked for it.
    pub fn author(&self) -> Option<&User> {
        self.expand.as_ref().and_then(|e| e.user.as_ref())
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

impl HasId for Post {
    fn id(&self) -> &str {
        &self.id
    }
}
