//! PocketBase REST client.
//!
//! Speaks the records API (`/api/collections/{collection}/records`), the
//! auth-refresh endpoint and the file URL scheme. The auth token is sent as
//! the raw `Authorization` header value, the way the PocketBase SDKs do.
//!
//! Requests carrying a request key cancel any in-flight request on the same
//! client with the same key. Every session gets its own client, so keys only
//! collide within one viewer's page load.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::error::{BackendError, BackendResult};
use super::query::{ListPage, ListQuery};
use super::{Backend, RecordStore, Session};
use crate::metrics::Metrics;
use crate::models::{USERS, User};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

struct InFlight {
    seq: u64,
    cancel: CancellationToken,
}

/// Response of `auth-refresh`.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    record: User,
}

/// PocketBase client, optionally bound to an auth token.
#[derive(Clone)]
pub struct PocketBaseClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    inflight: Arc<DashMap<String, InFlight>>,
    next_seq: Arc<AtomicU64>,
    metrics: Option<Arc<Metrics>>,
}

impl PocketBaseClient {
    /// Create an anonymous client for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
            inflight: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            metrics: None,
        })
    }

    /// Attach a metrics registry for backend request counters.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// A client sharing the connection pool but acting with `token`.
    ///
    /// The request-key table is not shared.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.anonymous()
        }
    }

    /// An anonymous client sharing the connection pool, with its own
    /// request-key table.
    pub fn anonymous(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: None,
            inflight: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            metrics: self.metrics.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn records_url(&self, collection: &str) -> BackendResult<Url> {
        let path = format!(
            "api/collections/{}/records",
            urlencoding::encode(collection)
        );
        Ok(self.base_url.join(&path)?)
    }

    fn record_url(&self, collection: &str, id: &str) -> BackendResult<Url> {
        let path = format!(
            "api/collections/{}/records/{}",
            urlencoding::encode(collection),
            urlencoding::encode(id)
        );
        Ok(self.base_url.join(&path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }

    /// Refresh the bound token, returning the new token and the user.
    pub async fn auth_refresh(&self) -> BackendResult<(String, User)> {
        if self.token.is_none() {
            return Err(BackendError::Unauthorized);
        }
        let path = format!(
            "api/collections/{}/auth-refresh",
            urlencoding::encode(USERS)
        );
        let url = self.base_url.join(&path)?;
        let value = self
            .execute(USERS, None, self.request(Method::POST, url))
            .await?;
        let auth: AuthResponse = serde_json::from_value(value)?;
        Ok((auth.token, auth.record))
    }

    /// Send a request, honouring request-key cancellation.
    async fn execute(
        &self,
        collection: &str,
        request_key: Option<&str>,
        request: RequestBuilder,
    ) -> BackendResult<Value> {
        let started = Instant::now();

        let result = match request_key {
            None => dispatch(request).await,
            Some(key) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                let cancel = CancellationToken::new();
                let previous = self.inflight.insert(
                    key.to_string(),
                    InFlight {
                        seq,
                        cancel: cancel.clone(),
                    },
                );
                if let Some(previous) = previous {
                    debug!(request_key = key, "cancelling superseded request");
                    previous.cancel.cancel();
                }

                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(BackendError::Cancelled(key.to_string())),
                    result = dispatch(request) => result,
                };

                self.inflight.remove_if(key, |_, entry| entry.seq == seq);
                result
            }
        };

        let elapsed = started.elapsed();
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        debug!(
            collection,
            request_key = request_key.unwrap_or(""),
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "backend request"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_backend(collection, outcome, elapsed.as_secs_f64());
        }

        result
    }
}

/// Send and decode, mapping error statuses to [`BackendError`].
async fn dispatch(request: RequestBuilder) -> BackendResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Value>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(BackendError::from_status(status.as_u16(), message))
}

#[async_trait]
impl RecordStore for PocketBaseClient {
    async fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        query: &ListQuery,
    ) -> BackendResult<ListPage<Value>> {
        let mut url = self.records_url(collection)?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("page", &page.to_string());
            params.append_pair("perPage", &per_page.to_string());
            if query.skip_total {
                params.append_pair("skipTotal", "1");
            }
            if let Some(filter) = query.filter_param() {
                params.append_pair("filter", &filter);
            }
            if let Some(sort) = query.sort_param() {
                params.append_pair("sort", &sort);
            }
            if let Some(expand) = query.expand_param() {
                params.append_pair("expand", &expand);
            }
        }

        let value = self
            .execute(
                collection,
                query.request_key.as_deref(),
                self.request(Method::GET, url),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_one(&self, collection: &str, id: &str, expand: &[String]) -> BackendResult<Value> {
        let mut url = self.record_url(collection, id)?;
        if !expand.is_empty() {
            url.query_pairs_mut()
                .append_pair("expand", &expand.join(","));
        }
        self.execute(collection, None, self.request(Method::GET, url))
            .await
    }

    async fn update(&self, collection: &str, id: &str, body: Value) -> BackendResult<Value> {
        let url = self.record_url(collection, id)?;
        self.execute(
            collection,
            None,
            self.request(Method::PATCH, url).json(&body),
        )
        .await
    }

    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
        thumb: Option<&str>,
    ) -> String {
        let mut url = format!(
            "{}api/files/{}/{}/{}",
            self.base_url,
            urlencoding::encode(collection_id),
            urlencoding::encode(record_id),
            urlencoding::encode(filename)
        );
        if let Some(thumb) = thumb {
            url.push_str("?thumb=");
            url.push_str(&urlencoding::encode(thumb));
        }
        url
    }
}

#[async_trait]
impl Backend for PocketBaseClient {
    async fn session(&self, token: Option<&str>) -> BackendResult<Session> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::anonymous(Arc::new(self.anonymous())));
        };

        match self.with_token(token).auth_refresh().await {
            Ok((fresh_token, user)) => {
                debug!(user_id = %user.id, "session resolved");
                Ok(Session::new(
                    Some(user),
                    Arc::new(self.with_token(fresh_token)),
                ))
            }
            Err(BackendError::Unauthorized) | Err(BackendError::NotFound) => {
                debug!("token rejected by backend; continuing anonymously");
                Ok(Session::anonymous(Arc::new(self.anonymous())))
            }
            Err(e) => Err(e),
        }
    }

    async fn healthy(&self) -> bool {
        let Ok(url) = self.base_url.join("api/health") else {
            return false;
        };
        match self.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "backend health check failed");
                false
            }
        }
    }

    fn kind(&self) -> &'static str {
        "pocketbase"
    }
}
