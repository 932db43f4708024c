//! Session view shared by every page.

use serde::Serialize;

use crate::backend::Session;
use crate::media::{AvatarThumb, avatar_url};
use crate::models::User;

/// The signed-in user, or `null` for anonymous visitors.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: Option<User>,
    /// Navigation avatar, absent without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Expose the session's user. Never touches the backend.
pub fn load_session(session: &Session) -> SessionView {
    let user = session.viewer().cloned();
    let avatar_url = user
        .as_ref()
        .and_then(|u| avatar_url(session.store(), u, AvatarThumb::Small));
    SessionView { user, avatar_url }
}
