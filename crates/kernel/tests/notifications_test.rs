#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Notification, badge and mark-read tests.

use pixfeed_kernel::feed::{
    FollowBackState, NotificationItem, load_notification_badge, load_notifications,
    mark_notifications_read,
};
use pixfeed_kernel::models::{FOLLOWS, LIKES};

mod common;
use common::{seeded_backend, session};

#[tokio::test]
async fn notifications_gather_requests_follows_and_likes() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let n = load_notifications(&session).await.unwrap();

    let pending: Vec<&str> = n.pending_requests.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(pending, vec!["f_dave_me"]);
    let follows: Vec<&str> = n.recent_follows.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(follows, vec!["f_alice_me", "f_bob_me"]);
    let likes: Vec<&str> = n.recent_likes.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(likes, vec!["l_alice_m1", "l_me_m2", "l_bob_m2"]);

    assert_eq!(n.unread_like_ids, vec!["l_alice_m1"]);
    assert_eq!(n.unread_follow_ids, vec!["f_alice_me"]);
    assert_eq!(n.pending_following_ids, vec!["carol"]);

    let like = &n.recent_likes[0];
    assert_eq!(like.liker().unwrap().username, "alice");
    assert_eq!(like.liked_post().unwrap().id, "m1");
}

#[tokio::test]
async fn timeline_is_newest_first() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let timeline = load_notifications(&session).await.unwrap().timeline();

    let ids: Vec<&str> = timeline.iter().map(NotificationItem::id).collect();
    assert_eq!(
        ids,
        vec![
            "l_alice_m1",
            "f_dave_me",
            "l_me_m2",
            "f_alice_me",
            "l_bob_m2",
            "f_bob_me"
        ]
    );
    assert!(matches!(timeline[1], NotificationItem::FollowRequest { .. }));
    assert!(matches!(timeline[3], NotificationItem::Follow { .. }));

    let json = serde_json::to_value(&timeline[0]).unwrap();
    assert_eq!(json["kind"], "like");
    assert_eq!(json["created"], "2025-01-01 00:40:00.000Z");
}

#[tokio::test]
async fn follow_back_state_distinguishes_requests() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let n = load_notifications(&session).await.unwrap();

    assert_eq!(n.follow_back_state("alice"), FollowBackState::Following);
    assert_eq!(n.follow_back_state("carol"), FollowBackState::Requested);
    assert_eq!(n.follow_back_state("dave"), FollowBackState::NotFollowing);
}

#[tokio::test]
async fn notifications_fail_when_a_query_fails() {
    let backend = seeded_backend();
    backend.fail_collection(LIKES, 500);
    let session = session(&backend, Some("me")).await;

    assert!(load_notifications(&session).await.is_err());
}

#[tokio::test]
async fn badge_counts_unread_items() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let badge = load_notification_badge(&session).await.unwrap();

    assert_eq!(badge.pending_requests, 1);
    assert_eq!(badge.unread_follows, 1);
    assert_eq!(badge.unread_likes, 1);
    assert_eq!(badge.total, 3);
}

#[tokio::test]
async fn anonymous_badge_is_zero() {
    let backend = seeded_backend();
    let session = session(&backend, None).await;

    let badge = load_notification_badge(&session).await.unwrap();

    assert_eq!(badge.total, 0);
}

#[tokio::test]
async fn marking_read_clears_the_badge_except_requests() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let n = load_notifications(&session).await.unwrap();
    let outcome = mark_notifications_read(&session, &n.unread_like_ids, &n.unread_follow_ids).await;
    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.failed, 0);

    assert_eq!(
        backend.record(LIKES, "l_alice_m1").unwrap()["read"],
        serde_json::json!(true)
    );
    assert_eq!(
        backend.record(FOLLOWS, "f_alice_me").unwrap()["read"],
        serde_json::json!(true)
    );

    let badge = load_notification_badge(&session).await.unwrap();
    assert_eq!(badge.total, 1);
    assert_eq!(badge.pending_requests, 1);
}

#[tokio::test]
async fn mark_read_is_best_effort() {
    let backend = seeded_backend();
    let session = session(&backend, Some("me")).await;

    let outcome = mark_notifications_read(
        &session,
        &["l_alice_m1".to_string(), "missing".to_string()],
        &[],
    )
    .await;

    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.failed, 1);
}
