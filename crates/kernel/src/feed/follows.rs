//! Follower, following and follow-request lists.

use serde::Serialize;

use super::filters;
use crate::backend::{BackendResult, ListQuery, Session, Sort};
use crate::models::{FOLLOWS, Follow};

/// Followers page.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Followers {
    /// Accepted followers, follower expanded.
    pub followers: Vec<Follow>,
    pub following_ids: Vec<String>,
    pub pending_following_ids: Vec<String>,
}

/// Following page.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Following {
    /// Accepted outgoing follows, followed user expanded.
    pub following: Vec<Follow>,
}

/// Follow requests page.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequests {
    pub pending_requests: Vec<Follow>,
    /// Everyone the viewer follows or has asked to follow.
    pub following_ids: Vec<String>,
}

fn followed_ids(follows: Vec<Follow>) -> Vec<String> {
    follows.into_iter().map(|f| f.following).collect()
}

/// Load the viewer's followers with follow-back state.
pub async fn load_followers(session: &Session) -> BackendResult<Followers> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(Followers::default());
    };

    let follows = session.collection(FOLLOWS);
    let followers_query = ListQuery::new()
        .filter(filters::followers_of(viewer_id))
        .expand("follower")
        .request_key("followersList");
    let following_query = ListQuery::new()
        .filter(filters::following_by(viewer_id))
        .request_key("followingCheck");
    let pending_query = ListQuery::new()
        .filter(filters::pending_following_by(viewer_id))
        .request_key("pendingFollowingCheck");

    let (followers, following, pending) = tokio::try_join!(
        follows.full_list::<Follow>(&followers_query),
        follows.full_list::<Follow>(&following_query),
        follows.full_list::<Follow>(&pending_query),
    )?;

    Ok(Followers {
        followers,
        following_ids: followed_ids(following),
        pending_following_ids: followed_ids(pending),
    })
}

/// Load the users the viewer follows.
pub async fn load_following(session: &Session) -> BackendResult<Following> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(Following::default());
    };

    let following = session
        .collection(FOLLOWS)
        .full_list(
            &ListQuery::new()
                .filter(filters::following_by(viewer_id))
                .expand("following")
                .request_key("followingList"),
        )
        .await?;

    Ok(Following { following })
}

/// Load incoming follow requests.
pub async fn load_requests(session: &Session) -> BackendResult<FollowRequests> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(FollowRequests::default());
    };

    let follows = session.collection(FOLLOWS);
    let requests_query = ListQuery::new()
        .filter(filters::pending_requests_for(viewer_id))
        .sort(Sort::desc("created"))
        .expand("follower");
    let following_query = ListQuery::new()
        .filter(filters::any_following_by(viewer_id))
        .request_key("requestsFollowingCheck");

    let (pending_requests, following) = tokio::try_join!(
        follows.full_list::<Follow>(&requests_query),
        follows.full_list::<Follow>(&following_query),
    )?;

    Ok(FollowRequests {
        pending_requests,
        following_ids: followed_ids(following),
    })
}
