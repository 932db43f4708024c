//! pixfeed test utilities.
//!
//! Record builders producing the JSON the backend stores for users, posts,
//! follows and likes, plus assertion helpers for JSON responses.

use serde_json::{Value as JsonValue, json};

/// Backend timestamp `minutes` after a fixed base time. Larger is newer.
pub fn at(minutes: u32) -> String {
    let day = 1 + minutes / (24 * 60);
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    format!("2025-01-{day:02} {hour:02}:{minute:02}:00.000Z")
}

/// Create a test user. The id doubles as the memory backend session token.
pub fn test_user(id: &str) -> TestUser {
    TestUser {
        id: id.to_string(),
        username: id.to_string(),
        name: String::new(),
        avatar: String::new(),
        is_public: false,
        created: at(0),
    }
}

/// A user record builder.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub is_public: bool,
    pub created: String,
}

impl TestUser {
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_avatar(mut self, avatar: &str) -> Self {
        self.avatar = avatar.to_string();
        self
    }

    /// Profile visible to everyone.
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "username": self.username,
            "name": self.name,
            "avatar": self.avatar,
            "isPublic": self.is_public,
            "verified": true,
            "created": self.created,
            "updated": self.created,
        })
    }
}

/// Create a test post by `user`.
pub fn test_post(id: &str, user: &str) -> TestPost {
    TestPost {
        id: id.to_string(),
        user: user.to_string(),
        images: vec![format!("{id}.jpg")],
        caption: String::new(),
        created: at(0),
    }
}

/// A post record builder.
#[derive(Debug, Clone)]
pub struct TestPost {
    pub id: String,
    pub user: String,
    pub images: Vec<String>,
    pub caption: String,
    pub created: String,
}

impl TestPost {
    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    pub fn with_images(mut self, images: &[&str]) -> Self {
        self.images = images.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set `created` to [`at`]`(minutes)`.
    pub fn created_at(mut self, minutes: u32) -> Self {
        self.created = at(minutes);
        self
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "user": self.user,
            "images": self.images,
            "caption": self.caption,
            "created": self.created,
            "updated": self.created,
        })
    }
}

/// Create an accepted, unread follow from `follower` to `following`.
pub fn test_follow(follower: &str, following: &str) -> TestFollow {
    TestFollow {
        id: None,
        follower: follower.to_string(),
        following: following.to_string(),
        accepted: true,
        read: false,
        created: at(0),
    }
}

/// A follow record builder.
#[derive(Debug, Clone)]
pub struct TestFollow {
    pub id: Option<String>,
    pub follower: String,
    pub following: String,
    pub accepted: bool,
    pub read: bool,
    pub created: String,
}

impl TestFollow {
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Not yet approved by the followed user.
    pub fn pending(mut self) -> Self {
        self.accepted = false;
        self
    }

    pub fn read(mut self) -> Self {
        self.read = true;
        self
    }

    pub fn created_at(mut self, minutes: u32) -> Self {
        self.created = at(minutes);
        self
    }

    pub fn to_json(&self) -> JsonValue {
        let mut record = json!({
            "follower": self.follower,
            "following": self.following,
            "accepted": self.accepted,
            "read": self.read,
            "created": self.created,
            "updated": self.created,
        });
        with_optional_id(&mut record, self.id.as_deref());
        record
    }
}

/// Create an unread like of `post` by `user`.
pub fn test_like(user: &str, post: &str) -> TestLike {
    TestLike {
        id: None,
        user: user.to_string(),
        post: post.to_string(),
        read: false,
        created: at(0),
    }
}

/// A like record builder.
#[derive(Debug, Clone)]
pub struct TestLike {
    pub id: Option<String>,
    pub user: String,
    pub post: String,
    pub read: bool,
    pub created: String,
}

impl TestLike {
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn read(mut self) -> Self {
        self.read = true;
        self
    }

    pub fn created_at(mut self, minutes: u32) -> Self {
        self.created = at(minutes);
        self
    }

    pub fn to_json(&self) -> JsonValue {
        let mut record = json!({
            "user": self.user,
            "post": self.post,
            "read": self.read,
            "created": self.created,
            "updated": self.created,
        });
        with_optional_id(&mut record, self.id.as_deref());
        record
    }
}

fn with_optional_id(record: &mut JsonValue, id: Option<&str>) {
    if let (Some(id), Some(obj)) = (id, record.as_object_mut()) {
        obj.insert("id".to_string(), JsonValue::String(id.to_string()));
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Ids of the objects in the array at `key`, in order.
    pub fn ids_at(value: &Value, key: &str) -> Vec<String> {
        value
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Assert that the string array at `key` holds exactly `expected`, in any
    /// order.
    pub fn same_strings(value: &Value, key: &str, expected: &[&str]) {
        let mut actual: Vec<&str> = value
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "Mismatch at '{key}' in {value}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_order() {
        assert_eq!(at(0), "2025-01-01 00:00:00.000Z");
        assert_eq!(at(61), "2025-01-01 01:01:00.000Z");
        assert_eq!(at(24 * 60), "2025-01-02 00:00:00.000Z");
        assert!(at(5) > at(4));
    }

    #[test]
    fn test_user_builder() {
        let user = test_user("alice").public().with_avatar("a.png").to_json();
        assert_eq!(user["username"], "alice");
        assert_eq!(user["isPublic"], true);
        assert_eq!(user["avatar"], "a.png");
    }

    #[test]
    fn test_follow_builder() {
        let follow = test_follow("a", "b").pending().to_json();
        assert_eq!(follow["accepted"], false);
        assert!(follow.get("id").is_none());

        let follow = test_follow("a", "b").with_id("f1").read().to_json();
        assert_eq!(follow["id"], "f1");
        assert_eq!(follow["read"], true);
    }

    #[test]
    fn test_post_builder() {
        let post = test_post("p1", "alice").with_caption("hi").to_json();
        assert_eq!(post["images"][0], "p1.jpg");
        assert_eq!(post["caption"], "hi");
    }

    #[test]
    fn test_assertions() {
        let json = json!({"posts": [{"id": "p2"}, {"id": "p1"}], "ids": ["b", "a"]});
        assert::has_key(&json, "posts");
        assert_eq!(assert::ids_at(&json, "posts"), vec!["p2", "p1"]);
        assert::same_strings(&json, "ids", &["a", "b"]);
    }
}
