//! Follow-graph filters shared by the loaders.

use crate::backend::Filter;

/// Accepted follows made by `user_id` (who they follow).
pub fn following_by(user_id: &str) -> Filter {
    Filter::eq("follower", user_id).and(Filter::eq("accepted", true))
}

/// Outgoing follow requests by `user_id` still awaiting approval.
pub fn pending_following_by(user_id: &str) -> Filter {
    Filter::eq("follower", user_id).and(Filter::eq("accepted", false))
}

/// Every follow made by `user_id`, accepted or not.
pub fn any_following_by(user_id: &str) -> Filter {
    Filter::eq("follower", user_id)
}

/// Accepted follows of `user_id` (their followers).
pub fn followers_of(user_id: &str) -> Filter {
    Filter::eq("following", user_id).and(Filter::eq("accepted", true))
}

/// Incoming follow requests for `user_id` still awaiting approval.
pub fn pending_requests_for(user_id: &str) -> Filter {
    Filter::eq("following", user_id).and(Filter::eq("accepted", false))
}

/// The follow edge from `follower` to `following`.
pub fn follow_edge(follower: &str, following: &str) -> Filter {
    Filter::eq("follower", follower).and(Filter::eq("following", following))
}

/// Likes on posts authored by `user_id`.
pub fn likes_on_posts_of(user_id: &str) -> Filter {
    Filter::eq("post.user", user_id)
}

/// Posts authored by `user_id`.
pub fn posts_by(user_id: &str) -> Filter {
    Filter::eq("user", user_id)
}
