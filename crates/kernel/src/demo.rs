//! Sample data for running against the in-memory backend.
//!
//! Three users: `alice` (public), `bob` (private) and `carol` (public).
//! Session tokens for the memory backend are user ids, so
//! `--token alice` signs in as alice.

use serde_json::json;

use crate::backend::{BackendResult, MemoryBackend};
use crate::models::{FOLLOWS, LIKES, POSTS, USERS};

fn at(day: u32, hour: u32) -> String {
    format!("2025-02-{day:02} {hour:02}:00:00.000Z")
}

/// Fill `backend` with a small follow graph, posts and likes.
pub fn seed(backend: &MemoryBackend) -> BackendResult<()> {
    for (id, username, name, is_public) in [
        ("alice", "alice", "Alice", true),
        ("bob", "bob", "Bob", false),
        ("carol", "carol", "", true),
    ] {
        let avatar = if id == "alice" { "alice_avatar.png" } else { "" };
        backend.insert(
            USERS,
            json!({
                "id": id,
                "username": username,
                "name": name,
                "avatar": avatar,
                "isPublic": is_public,
                "verified": true,
                "created": at(1, 9),
                "updated": at(1, 9),
            }),
        )?;
    }

    for (id, user, images, caption, day) in [
        ("alice_post_1", "alice", vec!["beach.jpg"], "Morning swim", 3),
        ("alice_post_2", "alice", vec!["city.jpg", "night.jpg"], "Lights", 6),
        ("bob_post_1", "bob", vec!["garden.jpg"], "First tomatoes", 4),
        ("carol_post_1", "carol", vec!["cat.jpg"], "", 5),
    ] {
        backend.insert(
            POSTS,
            json!({
                "id": id,
                "user": user,
                "images": images,
                "caption": caption,
                "created": at(day, 12),
                "updated": at(day, 12),
            }),
        )?;
    }

    for (follower, following, accepted, read, day) in [
        ("alice", "bob", true, true, 2),
        ("bob", "alice", true, false, 3),
        ("carol", "alice", false, false, 7),
        ("alice", "carol", false, false, 7),
    ] {
        backend.insert(
            FOLLOWS,
            json!({
                "follower": follower,
                "following": following,
                "accepted": accepted,
                "read": read,
                "created": at(day, 15),
                "updated": at(day, 15),
            }),
        )?;
    }

    for (user, post, read, day) in [
        ("bob", "alice_post_1", false, 4),
        ("carol", "alice_post_2", false, 8),
        ("alice", "bob_post_1", true, 5),
        ("alice", "alice_post_2", true, 6),
    ] {
        backend.insert(
            LIKES,
            json!({
                "user": user,
                "post": post,
                "read": read,
                "created": at(day, 18),
                "updated": at(day, 18),
            }),
        )?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn seeds_every_collection() {
        let backend = MemoryBackend::new();
        seed(&backend).unwrap();
        assert_eq!(backend.len(USERS), 3);
        assert_eq!(backend.len(POSTS), 4);
        assert_eq!(backend.len(FOLLOWS), 4);
        assert_eq!(backend.len(LIKES), 4);
    }
}
