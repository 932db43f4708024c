//! Notifications, activity timeline, badge and follow requests.

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::backend::Session;
use crate::error::{AppError, AppResult};
use crate::feed::{
    FollowRequests, MarkReadOutcome, NotificationBadge, NotificationItem, Notifications,
    load_notification_badge, load_notifications, load_requests, mark_notifications_read,
};
use crate::state::AppState;

/// Create the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications))
        .route("/activity", get(notifications))
        .route("/notifications/badge", get(badge))
        .route("/notifications/read", post(mark_read))
        .route("/requests", get(requests))
}

/// Notifications plus the merged timeline.
#[derive(Debug, Serialize)]
struct NotificationsPage {
    #[serde(flatten)]
    notifications: Notifications,
    timeline: Vec<NotificationItem>,
}

async fn notifications(
    Extension(session): Extension<Session>,
) -> AppResult<Json<NotificationsPage>> {
    let notifications = load_notifications(&session).await?;
    let timeline = notifications.timeline();
    Ok(Json(NotificationsPage {
        notifications,
        timeline,
    }))
}

async fn badge(Extension(session): Extension<Session>) -> AppResult<Json<NotificationBadge>> {
    Ok(Json(load_notification_badge(&session).await?))
}

/// Ids to mark read. Both lists may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadRequest {
    #[serde(default)]
    like_ids: Vec<String>,
    #[serde(default)]
    follow_ids: Vec<String>,
}

async fn mark_read(
    Extension(session): Extension<Session>,
    Json(request): Json<MarkReadRequest>,
) -> AppResult<Json<MarkReadOutcome>> {
    if !session.is_authenticated() {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(
        mark_notifications_read(&session, &request.like_ids, &request.follow_ids).await,
    ))
}

async fn requests(Extension(session): Extension<Session>) -> AppResult<Json<FollowRequests>> {
    Ok(Json(load_requests(&session).await?))
}
