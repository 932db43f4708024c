//! Single post page.

use serde::Serialize;
use tracing::debug;

use super::likes::liked_post_ids_for_posts;
use crate::backend::{BackendResult, Session};
use crate::models::{POSTS, Post};

/// Single post view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub post: Post,
    pub liked_post_ids: Vec<String>,
}

async fn fetch(session: &Session, id: &str) -> BackendResult<PostPage> {
    let post: Post = session.collection(POSTS).get_one(id, &["user"]).await?;

    let liked_post_ids = match session.viewer_id() {
        Some(viewer_id) => {
            liked_post_ids_for_posts(
                session.store(),
                viewer_id,
                std::slice::from_ref(&post),
                Some("singlePostLikes"),
            )
            .await?
        }
        None => Vec::new(),
    };

    Ok(PostPage {
        post,
        liked_post_ids,
    })
}

/// Load a post with its author. Any failure, including a post hidden by
/// access rules, reads as "not found".
pub async fn load_post(session: &Session, id: &str) -> Option<PostPage> {
    match fetch(session, id).await {
        Ok(page) => Some(page),
        Err(e) => {
            debug!(error = %e, post_id = id, "post unavailable");
            None
        }
    }
}
