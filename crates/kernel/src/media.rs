//! File URLs for avatars and post images.

use crate::backend::RecordStore;
use crate::models::{Post, User};

/// Avatar thumbnail sizes configured on the `users.avatar` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarThumb {
    /// List rows and post headers.
    #[default]
    Small,
    /// Profile headers.
    Large,
}

impl AvatarThumb {
    pub fn as_str(self) -> &'static str {
        match self {
            AvatarThumb::Small => "100x100",
            AvatarThumb::Large => "320x320",
        }
    }
}

/// Square thumbnail configured on `posts.images`.
pub const POST_THUMB: &str = "100x100";

/// Avatar URL, or `None` when the user has no avatar.
pub fn avatar_url(store: &dyn RecordStore, user: &User, thumb: AvatarThumb) -> Option<String> {
    if !user.has_avatar() {
        return None;
    }
    Some(store.file_url(
        &user.collection_id,
        &user.id,
        &user.avatar,
        Some(thumb.as_str()),
    ))
}

/// Thumbnail of a post's first image, or `None` for a post without images.
pub fn post_thumbnail_url(store: &dyn RecordStore, post: &Post) -> Option<String> {
    let image = post.first_image()?;
    Some(store.file_url(&post.collection_id, &post.id, image, Some(POST_THUMB)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::PocketBaseClient;
    use crate::backend::pocketbase::DEFAULT_TIMEOUT;
    use serde_json::json;

    fn user(avatar: &str) -> User {
        serde_json::from_value(json!({
            "id": "u1",
            "collectionId": "_pb_users_auth_",
            "username": "ada",
            "avatar": avatar,
            "created": "2025-02-05 17:30:41.123Z",
            "updated": "2025-02-05 17:30:41.123Z"
        }))
        .unwrap()
    }

    fn post(images: &[&str]) -> Post {
        serde_json::from_value(json!({
            "id": "p1",
            "collectionId": "pbc_1125843985",
            "user": "u1",
            "images": images,
            "created": "2025-02-05 17:30:41.123Z",
            "updated": "2025-02-05 17:30:41.123Z"
        }))
        .unwrap()
    }

    #[test]
    fn avatar_urls_use_thumbs() {
        let client = PocketBaseClient::new("http://pb.local", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            avatar_url(&client, &user("me.png"), AvatarThumb::Large).as_deref(),
            Some("http://pb.local/api/files/_pb_users_auth_/u1/me.png?thumb=320x320")
        );
        assert!(avatar_url(&client, &user(""), AvatarThumb::Small).is_none());
    }

    #[test]
    fn post_thumbnail_uses_first_image() {
        let client = PocketBaseClient::new("http://pb.local", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            post_thumbnail_url(&client, &post(&["a.jpg", "b.jpg"])).as_deref(),
            Some("http://pb.local/api/files/pbc_1125843985/p1/a.jpg?thumb=100x100")
        );
        assert!(post_thumbnail_url(&client, &post(&[])).is_none());
    }
}
