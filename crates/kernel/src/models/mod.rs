//! Collection records.
//!
//! Field names follow the backend's JSON (camelCase); relations arrive as
//! record ids and, when requested, as expanded records under `expand`.

pub mod follow;
pub mod like;
pub mod post;
pub mod timestamp;
pub mod user;

pub use follow::{FOLLOWS, Follow, FollowExpand};
pub use like::{LIKES, Like, LikeExpand};
pub use post::{POSTS, Post, PostExpand};
pub use user::{USERS, User};

/// Anything addressable by record id.
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for String {
    fn id(&self) -> &str {
        self
    }
}

impl HasId for &str {
    fn id(&self) -> &str {
        self
    }
}
