//! Home feed: posts by the viewer and everyone they follow.

use serde::Serialize;

use super::filters;
use super::likes::liked_post_ids_for_posts;
use crate::backend::{BackendResult, Filter, ListQuery, Session, Sort};
use crate::models::{FOLLOWS, Follow, POSTS, Post};

/// Home feed view.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    /// Newest first, author expanded.
    pub posts: Vec<Post>,
    pub liked_post_ids: Vec<String>,
}

/// Authors whose posts make up the feed: the viewer, then every user they
/// follow with an accepted follow. Duplicates are dropped.
pub fn feed_author_ids(viewer_id: &str, follows: &[Follow]) -> Vec<String> {
    let mut ids = vec![viewer_id.to_string()];
    for follow in follows {
        if !ids.contains(&follow.following) {
            ids.push(follow.following.clone());
        }
    }
    ids
}

/// Load the home feed. Anonymous viewers get an empty feed.
pub async fn load_home(session: &Session) -> BackendResult<HomeFeed> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(HomeFeed::default());
    };

    let follows: Vec<Follow> = session
        .collection(FOLLOWS)
        .full_list(
            &ListQuery::new()
                .filter(filters::following_by(viewer_id))
                .request_key("feedFollows"),
        )
        .await?;

    let author_ids = feed_author_ids(viewer_id, &follows);

    let posts: Vec<Post> = session
        .collection(POSTS)
        .full_list(
            &ListQuery::new()
                .filter(Filter::any_of("user", &author_ids))
                .sort(Sort::desc("created"))
                .expand("user")
                .request_key("feedPosts"),
        )
        .await?;

    let liked_post_ids =
        liked_post_ids_for_posts(session.store(), viewer_id, &posts, Some("feedLikes")).await?;

    Ok(HomeFeed {
        posts,
        liked_post_ids,
    })
}
