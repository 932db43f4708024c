#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests run the REAL router and loaders against the in-memory backend,
//! seeded with a small social graph. Memory backend session tokens are user
//! ids, so `Some("me")` signs in as `me`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pixfeed_kernel::backend::{Backend, MemoryBackend, Session};
use pixfeed_kernel::metrics::Metrics;
use pixfeed_kernel::models::{FOLLOWS, LIKES, POSTS, USERS};
use pixfeed_kernel::{AppState, build_router};
use pixfeed_test_utils::{test_follow, test_like, test_post, test_user};

/// Seed the graph used across tests.
///
/// Users: `me` (private), `alice` (public), `bob` (private), `carol`
/// (private), `dave` (public).
///
/// - me follows alice and bob; me asked to follow carol (pending)
/// - alice follows me (unread), bob follows me (read), dave asked to follow me
/// - posts: me m1 (1) m2 (20), alice a1 (15), bob b1 (12), carol c1 (25),
///   dave d1 (3)
/// - likes: me on a1 and m2 (self, read), alice on m1 (unread, newest),
///   bob on m2 (read)
pub fn seeded_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();

    for user in [
        test_user("me").with_name("Me Myself"),
        test_user("alice").public().with_avatar("alice.png"),
        test_user("bob"),
        test_user("carol"),
        test_user("dave").public(),
    ] {
        backend.insert(USERS, user.to_json()).unwrap();
    }

    for post in [
        test_post("m1", "me").created_at(1),
        test_post("m2", "me").created_at(20),
        test_post("a1", "alice").created_at(15).with_caption("hello"),
        test_post("b1", "bob").created_at(12),
        test_post("c1", "carol").created_at(25),
        test_post("d1", "dave").created_at(3),
    ] {
        backend.insert(POSTS, post.to_json()).unwrap();
    }

    for follow in [
        test_follow("me", "alice").with_id("f_me_alice").read().created_at(2),
        test_follow("me", "bob").with_id("f_me_bob").read().created_at(2),
        test_follow("me", "carol").with_id("f_me_carol").pending().created_at(4),
        test_follow("alice", "me").with_id("f_alice_me").created_at(10),
        test_follow("bob", "me").with_id("f_bob_me").read().created_at(5),
        test_follow("dave", "me").with_id("f_dave_me").pending().created_at(30),
    ] {
        backend.insert(FOLLOWS, follow.to_json()).unwrap();
    }

    for like in [
        test_like("me", "a1").with_id("l_me_a1").read().created_at(21),
        test_like("me", "m2").with_id("l_me_m2").read().created_at(22),
        test_like("alice", "m1").with_id("l_alice_m1").created_at(40),
        test_like("bob", "m2").with_id("l_bob_m2").read().created_at(8),
    ] {
        backend.insert(LIKES, like.to_json()).unwrap();
    }

    backend
}

/// Session for `token` on `backend`.
pub async fn session(backend: &MemoryBackend, token: Option<&str>) -> Session {
    backend.session(token).await.unwrap()
}

/// Test application wrapper using the REAL router and state.
pub struct TestApp {
    router: Router,
    pub backend: MemoryBackend,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_backend(seeded_backend())
    }

    pub fn with_backend(backend: MemoryBackend) -> Self {
        let state = AppState::with_backend(Arc::new(backend.clone()), Arc::new(Metrics::new()));
        let router = build_router(state.clone());
        Self {
            router,
            backend,
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri`, signed in as `token` when given.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a JSON body to `uri`.
    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// GET `uri` expecting 200 and return the JSON body.
    pub async fn get_json(&self, uri: &str, token: Option<&str>) -> Value {
        let response = self.get(uri, token).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_json(response).await
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
