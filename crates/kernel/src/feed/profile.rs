//! The viewer's own profile page.

use serde::Serialize;

use super::filters;
use super::likes::liked_post_ids_for_posts;
use crate::backend::{BackendResult, ListQuery, Session, Sort};
use crate::models::{FOLLOWS, POSTS, Post};

/// Own-profile view.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfile {
    pub posts: Vec<Post>,
    pub followers_count: i64,
    pub following_count: i64,
    pub liked_post_ids: Vec<String>,
}

/// Load the viewer's posts and follow counts concurrently, then the likes
/// on those posts.
pub async fn load_own_profile(session: &Session) -> BackendResult<OwnProfile> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(OwnProfile::default());
    };

    let posts_query = ListQuery::new()
        .filter(filters::posts_by(viewer_id))
        .sort(Sort::desc("created"))
        .expand("user")
        .request_key("profilePosts");
    let post_records = session.collection(POSTS);
    let follow_records = session.collection(FOLLOWS);

    let (posts, followers_count, following_count) = tokio::try_join!(
        post_records.full_list::<Post>(&posts_query),
        follow_records.count(filters::followers_of(viewer_id), Some("profileFollowers")),
        follow_records.count(filters::following_by(viewer_id), Some("profileFollowing")),
    )?;

    let liked_post_ids =
        liked_post_ids_for_posts(session.store(), viewer_id, &posts, Some("profileLikes")).await?;

    Ok(OwnProfile {
        posts,
        followers_count,
        following_count,
        liked_post_ids,
    })
}
