//! Page loaders.
//!
//! Each loader takes the request's [`Session`](crate::backend::Session) and
//! returns the data one page needs. Independent queries run concurrently;
//! anonymous sessions get empty views without touching the backend.

pub mod filters;
mod follows;
mod home;
mod likes;
mod notifications;
mod post;
mod profile;
mod session;
mod user_profile;

pub use follows::{FollowRequests, Followers, Following, load_followers, load_following, load_requests};
pub use home::{HomeFeed, feed_author_ids, load_home};
pub use likes::{LIKE_FILTER_CHUNK, liked_post_ids_for_posts};
pub use notifications::{
    FollowBackState, MarkReadOutcome, NotificationBadge, NotificationItem, Notifications,
    follow_back_state, load_notification_badge, load_notifications, mark_notifications_read,
};
pub use post::{PostPage, load_post};
pub use profile::{OwnProfile, load_own_profile};
pub use session::{SessionView, load_session};
pub use user_profile::{UserProfile, can_view_posts, load_user_profile};
