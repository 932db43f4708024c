//! Landing page and layout session.

use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::backend::Session;
use crate::feed::{SessionView, load_session};
use crate::state::AppState;

/// Create the front page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(front_page))
        .route("/session", get(session_view))
}

/// Signed-in visitors go to their feed; everyone else gets `{"user": null}`.
async fn front_page(Extension(session): Extension<Session>) -> Response {
    if session.is_authenticated() {
        return Redirect::temporary("/home").into_response();
    }
    Json(load_session(&session)).into_response()
}

async fn session_view(Extension(session): Extension<Session>) -> Json<SessionView> {
    Json(load_session(&session))
}
