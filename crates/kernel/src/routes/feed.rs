//! Home feed and single post pages.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::backend::Session;
use crate::error::{AppError, AppResult};
use crate::feed::{HomeFeed, PostPage, load_home, load_post};
use crate::state::AppState;

/// Create the feed router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/post/{id}", get(post))
}

async fn home(Extension(session): Extension<Session>) -> AppResult<Json<HomeFeed>> {
    Ok(Json(load_home(&session).await?))
}

async fn post(
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> AppResult<Json<PostPage>> {
    load_post(&session, &id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}
