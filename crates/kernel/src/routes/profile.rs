//! Own profile, follow lists and other users' profiles.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::backend::Session;
use crate::error::AppResult;
use crate::feed::{
    Followers, Following, OwnProfile, UserProfile, load_followers, load_following,
    load_own_profile, load_user_profile,
};
use crate::state::AppState;

/// Create the profile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(own_profile))
        .route("/profile/followers", get(followers))
        .route("/profile/following", get(following))
        .route("/u/{username}", get(user_profile))
        // Older links used the long form.
        .route("/user/{username}", get(user_profile))
}

async fn own_profile(Extension(session): Extension<Session>) -> AppResult<Json<OwnProfile>> {
    Ok(Json(load_own_profile(&session).await?))
}

async fn followers(Extension(session): Extension<Session>) -> AppResult<Json<Followers>> {
    Ok(Json(load_followers(&session).await?))
}

async fn following(Extension(session): Extension<Session>) -> AppResult<Json<Following>> {
    Ok(Json(load_following(&session).await?))
}

/// Unknown usernames answer 200 with `profileUser: null`.
async fn user_profile(
    Extension(session): Extension<Session>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_user_profile(&session, &username).await?))
}
