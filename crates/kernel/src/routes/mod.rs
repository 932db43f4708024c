//! HTTP route handlers.
//!
//! One JSON endpoint per page loader. Every handler receives the request's
//! [`Session`](crate::backend::Session) from the session middleware.

pub mod feed;
pub mod front;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod profile;

use axum::Router;

use crate::middleware;
use crate::state::AppState;

/// The full application router with session and metrics middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(front::router())
        .merge(feed::router())
        .merge(profile::router())
        .merge(notifications::router())
        .merge(health::router())
        .merge(metrics::router())
        // route_layer runs after routing so the matched path is known.
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::record_metrics,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_session,
        ))
        .with_state(state)
}
