//! Session resolution middleware.
//!
//! Reads `Authorization: Bearer <token>`, asks the backend who the token
//! belongs to and stores the resulting [`Session`] in request extensions.
//! Missing or rejected tokens give an anonymous session; only a backend
//! failure while checking the token fails the request.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Token from an `Authorization` header. A bare token without the `Bearer`
/// scheme is accepted too, matching the backend's own header format.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = match value.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {
            let rest = &value[6..];
            // "Bearertoken" is a raw token that happens to start with the word.
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest
            } else {
                value
            }
        }
        _ => value,
    }
    .trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware inserting a [`Session`] for every request.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_string);

    let session: Session = match state.backend().session(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            debug!(error = %e, backend = state.backend().kind(), "session resolution failed");
            return AppError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}
