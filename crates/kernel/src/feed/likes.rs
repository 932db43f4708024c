//! Which posts of a batch the viewer has liked.

use futures::future::try_join_all;

use crate::backend::{BackendResult, Collection, Filter, ListQuery, RecordStore};
use crate::models::{HasId, LIKES, Like};

/// Maximum post ids per likes query. Larger batches are split and the
/// chunks fetched concurrently, keeping filter strings short.
pub const LIKE_FILTER_CHUNK: usize = 50;

/// Ids of the posts in `posts` that `user_id` has liked.
///
/// An empty batch returns immediately without a backend request.
pub async fn liked_post_ids_for_posts<P>(
    store: &dyn RecordStore,
    user_id: &str,
    posts: &[P],
    request_key: Option<&str>,
) -> BackendResult<Vec<String>>
where
    P: HasId + Sync,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let likes = Collection::new(store, LIKES);
    let likes = &likes;

    let requests = posts.chunks(LIKE_FILTER_CHUNK).enumerate().map(|(i, chunk)| {
        let filter = Filter::eq("user", user_id)
            .and(Filter::any_of("post", chunk.iter().map(HasId::id)));
        // Chunks must not share a key or they would cancel each other.
        let key = request_key.map(|k| if i == 0 { k.to_string() } else { format!("{k}-{i}") });
        let query = ListQuery::new()
            .filter(filter)
            .maybe_request_key(key.as_deref());
        async move { likes.full_list::<Like>(&query).await }
    });

    let batches = try_join_all(requests).await?;
    Ok(batches
        .into_iter()
        .flatten()
        .map(|like| like.post)
        .collect())
}
