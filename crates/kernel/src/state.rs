//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::backend::{Backend, PocketBaseClient};
use crate::config::Config;
use crate::metrics::Metrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Resolves bearer tokens into sessions.
    backend: Arc<dyn Backend>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create state talking to the PocketBase server named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let client = PocketBaseClient::new(&config.pocketbase_url, config.backend_timeout)
            .context("invalid POCKETBASE_URL")?
            .with_metrics(metrics.clone());

        info!(url = %client.base_url(), "PocketBase client configured");

        Ok(Self::with_backend(Arc::new(client), metrics))
    }

    /// Create state over any backend.
    pub fn with_backend(backend: Arc<dyn Backend>, metrics: Arc<Metrics>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { backend, metrics }),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}
