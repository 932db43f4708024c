//! Notifications: follow requests, new followers and likes on the viewer's
//! posts, plus the unread badge and marking items read.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::filters;
use crate::backend::{BackendResult, Filter, ListQuery, Session, Sort};
use crate::models::{FOLLOWS, Follow, LIKES, Like, timestamp};

/// Notifications view.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    /// Incoming follow requests awaiting approval, follower expanded.
    pub pending_requests: Vec<Follow>,
    /// Accepted incoming follows ("started following you").
    pub recent_follows: Vec<Follow>,
    /// Likes on the viewer's posts, liker and post expanded.
    pub recent_likes: Vec<Like>,
    /// Users the viewer follows (accepted), for follow-back buttons.
    pub following_ids: Vec<String>,
    /// Users the viewer has asked to follow, still pending.
    pub pending_following_ids: Vec<String>,
    pub unread_like_ids: Vec<String>,
    pub unread_follow_ids: Vec<String>,
}

/// One entry of the merged notification timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationItem {
    FollowRequest {
        id: String,
        #[serde(with = "timestamp")]
        created: DateTime<Utc>,
        request: Follow,
    },
    Follow {
        id: String,
        #[serde(with = "timestamp")]
        created: DateTime<Utc>,
        follow: Follow,
    },
    Like {
        id: String,
        #[serde(with = "timestamp")]
        created: DateTime<Utc>,
        like: Like,
    },
}

impl NotificationItem {
    pub fn id(&self) -> &str {
        match self {
            NotificationItem::FollowRequest { id, .. }
            | NotificationItem::Follow { id, .. }
            | NotificationItem::Like { id, .. } => id,
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        match self {
            NotificationItem::FollowRequest { created, .. }
            | NotificationItem::Follow { created, .. }
            | NotificationItem::Like { created, .. } => *created,
        }
    }
}

impl Notifications {
    /// All notifications merged into one list, newest first.
    pub fn timeline(&self) -> Vec<NotificationItem> {
        let requests = self
            .pending_requests
            .iter()
            .map(|f| NotificationItem::FollowRequest {
                id: f.id.clone(),
                created: f.created,
                request: f.clone(),
            });
        let follows = self.recent_follows.iter().map(|f| NotificationItem::Follow {
            id: f.id.clone(),
            created: f.created,
            follow: f.clone(),
        });
        let likes = self.recent_likes.iter().map(|l| NotificationItem::Like {
            id: l.id.clone(),
            created: l.created,
            like: l.clone(),
        });

        let mut items: Vec<NotificationItem> = requests.chain(follows).chain(likes).collect();
        // Stable sort keeps requests ahead of follows ahead of likes on ties.
        items.sort_by_key(|item| std::cmp::Reverse(item.created()));
        items
    }

    /// Whether `user_id` is followed or has a pending request from the
    /// viewer.
    pub fn follow_back_state(&self, user_id: &str) -> FollowBackState {
        follow_back_state(&self.following_ids, &self.pending_following_ids, user_id)
    }
}

/// Relationship used to label a "follow back" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowBackState {
    Following,
    Requested,
    NotFollowing,
}

pub fn follow_back_state(
    following_ids: &[String],
    pending_following_ids: &[String],
    user_id: &str,
) -> FollowBackState {
    if following_ids.iter().any(|id| id == user_id) {
        FollowBackState::Following
    } else if pending_following_ids.iter().any(|id| id == user_id) {
        FollowBackState::Requested
    } else {
        FollowBackState::NotFollowing
    }
}

/// Load the notifications page. The five queries are independent and run
/// concurrently.
pub async fn load_notifications(session: &Session) -> BackendResult<Notifications> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(Notifications::default());
    };

    let follows = session.collection(FOLLOWS);
    let likes = session.collection(LIKES);

    let pending_query = ListQuery::new()
        .filter(filters::pending_requests_for(viewer_id))
        .sort(Sort::desc("created"))
        .expand("follower");
    let recent_follows_query = ListQuery::new()
        .filter(filters::followers_of(viewer_id))
        .sort(Sort::desc("created"))
        .expand("follower")
        .request_key("recentFollows");
    let recent_likes_query = ListQuery::new()
        .filter(filters::likes_on_posts_of(viewer_id))
        .sort(Sort::desc("created"))
        .expand("user")
        .expand("post")
        .request_key("recentLikes");
    let following_query = ListQuery::new()
        .filter(filters::following_by(viewer_id))
        .request_key("notificationsFollowingCheck");
    let pending_following_query = ListQuery::new()
        .filter(filters::pending_following_by(viewer_id))
        .request_key("pendingFollowingCheck");

    let (pending_requests, recent_follows, recent_likes, following, pending_following) = tokio::try_join!(
        follows.full_list::<Follow>(&pending_query),
        follows.full_list::<Follow>(&recent_follows_query),
        likes.full_list::<Like>(&recent_likes_query),
        follows.full_list::<Follow>(&following_query),
        follows.full_list::<Follow>(&pending_following_query),
    )?;

    let following_ids = following.into_iter().map(|f| f.following).collect();
    let pending_following_ids = pending_following.into_iter().map(|f| f.following).collect();
    let unread_like_ids = recent_likes
        .iter()
        .filter(|l| !l.read)
        .map(|l| l.id.clone())
        .collect();
    let unread_follow_ids = recent_follows
        .iter()
        .filter(|f| !f.read)
        .map(|f| f.id.clone())
        .collect();

    Ok(Notifications {
        pending_requests,
        recent_follows,
        recent_likes,
        following_ids,
        pending_following_ids,
        unread_like_ids,
        unread_follow_ids,
    })
}

/// Unread counts for the navigation badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBadge {
    /// Follow requests stay counted until answered.
    pub pending_requests: i64,
    pub unread_follows: i64,
    pub unread_likes: i64,
    pub total: i64,
}

/// Count unread notifications with three concurrent one-item queries.
pub async fn load_notification_badge(session: &Session) -> BackendResult<NotificationBadge> {
    let Some(viewer_id) = session.viewer_id() else {
        return Ok(NotificationBadge::default());
    };

    let follows = session.collection(FOLLOWS);
    let likes = session.collection(LIKES);
    let unread = || Filter::eq("read", false);

    let (pending_requests, unread_follows, unread_likes) = tokio::try_join!(
        follows.count(filters::pending_requests_for(viewer_id), Some("badgeRequests")),
        follows.count(
            filters::followers_of(viewer_id).and(unread()),
            Some("badgeFollows")
        ),
        likes.count(
            filters::likes_on_posts_of(viewer_id).and(unread()),
            Some("badgeLikes")
        ),
    )?;

    Ok(NotificationBadge {
        pending_requests,
        unread_follows,
        unread_likes,
        total: pending_requests + unread_follows + unread_likes,
    })
}

/// Result of marking notifications read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadOutcome {
    pub updated: usize,
    pub failed: usize,
}

/// Set `read = true` on the given likes and follows, all concurrently.
///
/// Failures are logged and counted; the call itself never fails.
pub async fn mark_notifications_read(
    session: &Session,
    like_ids: &[String],
    follow_ids: &[String],
) -> MarkReadOutcome {
    if !session.is_authenticated() {
        return MarkReadOutcome::default();
    }

    let likes = session.collection(LIKES);
    let follows = session.collection(FOLLOWS);
    let body = json!({ "read": true });

    let updates = like_ids
        .iter()
        .map(|id| (&likes, id))
        .chain(follow_ids.iter().map(|id| (&follows, id)))
        .map(|(collection, id)| {
            let body = body.clone();
            async move {
                let result = collection.update::<Value>(id, body).await;
                (collection.name(), id, result)
            }
        });

    let mut outcome = MarkReadOutcome::default();
    for (collection, id, result) in join_all(updates).await {
        match result {
            Ok(_) => outcome.updated += 1,
            Err(e) => {
                warn!(error = %e, collection, record_id = %id, "failed to mark notification read");
                outcome.failed += 1;
            }
        }
    }

    debug!(
        updated = outcome.updated,
        failed = outcome.failed,
        "marked notifications read"
    );
    outcome
}
