//! Another user's profile, looked up by username.
//!
//! Posts are only fetched when the viewer may see them: their own profile,
//! a public profile, or a profile they follow with an accepted follow. The
//! backend enforces the same rule; checking here avoids a pointless query
//! and lets the page show the locked state.

use serde::Serialize;
use tracing::warn;

use super::filters;
use super::likes::liked_post_ids_for_posts;
use crate::backend::{BackendResult, Filter, ListQuery, Session, Sort};
use crate::media::{AvatarThumb, avatar_url};
use crate::models::{FOLLOWS, Follow, POSTS, Post, USERS, User};

/// User profile view.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// `None` when no user has that username.
    pub profile_user: Option<User>,
    /// Profile header avatar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub posts: Vec<Post>,
    /// The viewer's follow edge to the profile user, pending or accepted.
    pub follow_status: Option<Follow>,
    pub is_own_profile: bool,
    pub liked_post_ids: Vec<String>,
}

/// Whether the viewer may see `profile_user`'s posts.
pub fn can_view_posts(is_own_profile: bool, profile_user: &User, follow: Option<&Follow>) -> bool {
    is_own_profile || profile_user.is_public || follow.is_some_and(|f| f.accepted)
}

/// Load a profile page. Unknown usernames yield an empty view, not an error.
pub async fn load_user_profile(session: &Session, username: &str) -> BackendResult<UserProfile> {
    let profile_user: User = match session
        .collection(USERS)
        .first_list_item(Filter::eq("username", username))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            if !e.is_not_found() {
                warn!(error = %e, username, "profile lookup failed; showing empty profile");
            }
            return Ok(UserProfile::default());
        }
    };

    let viewer_id = session.viewer_id();
    let is_own_profile = viewer_id == Some(profile_user.id.as_str());

    let follow_status = match viewer_id {
        Some(viewer_id) if !is_own_profile => {
            match session
                .collection(FOLLOWS)
                .first_list_item::<Follow>(filters::follow_edge(viewer_id, &profile_user.id))
                .await
            {
                Ok(follow) => Some(follow),
                Err(e) => {
                    if !e.is_not_found() {
                        warn!(error = %e, "follow status lookup failed; treating as not following");
                    }
                    None
                }
            }
        }
        _ => None,
    };

    let mut posts = Vec::new();
    let mut liked_post_ids = Vec::new();

    if can_view_posts(is_own_profile, &profile_user, follow_status.as_ref()) {
        posts = session
            .collection(POSTS)
            .full_list::<Post>(
                &ListQuery::new()
                    .filter(filters::posts_by(&profile_user.id))
                    .sort(Sort::desc("created"))
                    .expand("user"),
            )
            .await?;

        if let Some(viewer_id) = viewer_id {
            liked_post_ids = liked_post_ids_for_posts(
                session.store(),
                viewer_id,
                &posts,
                Some("userProfileLikes"),
            )
            .await?;
        }
    }

    Ok(UserProfile {
        avatar_url: avatar_url(session.store(), &profile_user, AvatarThumb::Large),
        profile_user: Some(profile_user),
        posts,
        follow_status,
        is_own_profile,
        liked_post_ids,
    })
}
