//! Prometheus metrics collection.
//!
//! Counts page loads served over HTTP and every request sent to the
//! backend, so slow or failing collections show up per collection.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Backend request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct BackendLabels {
    pub collection: String,
    /// `ok` or a [`BackendError::kind`](crate::backend::BackendError::kind).
    pub outcome: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Backend request counter by collection/outcome.
    pub backend_requests: Family<BackendLabels, Counter>,

    /// Backend request duration histogram.
    pub backend_duration_seconds: Family<BackendLabels, Histogram>,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let backend_requests = Family::<BackendLabels, Counter>::default();
        registry.register(
            "backend_requests",
            "Total requests sent to the backend",
            backend_requests.clone(),
        );

        let backend_duration_seconds =
            Family::<BackendLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 14))
            });
        registry.register(
            "backend_request_duration_seconds",
            "Backend request duration in seconds",
            backend_duration_seconds.clone(),
        );

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            backend_requests,
            backend_duration_seconds,
        }
    }

    /// Record an HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: path.to_string(),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a backend request.
    pub fn record_backend(&self, collection: &str, outcome: &str, duration_secs: f64) {
        let labels = BackendLabels {
            collection: collection.to_string(),
            outcome: outcome.to_string(),
        };

        self.backend_requests.get_or_create(&labels).inc();
        self.backend_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        let output = metrics.encode();
        assert!(output.contains("# TYPE backend_requests counter"));
    }

    #[test]
    fn test_record_backend() {
        let metrics = Metrics::new();
        metrics.record_backend("posts", "ok", 0.01);
        metrics.record_backend("posts", "not_found", 0.02);

        let output = metrics.encode();
        assert!(output.contains("backend_requests_total"));
        assert!(output.contains("collection=\"posts\""));
        assert!(output.contains("outcome=\"not_found\""));
    }

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();
        metrics.record_request("GET", "/u/{username}", 200, 0.05);

        let output = metrics.encode();
        assert!(output.contains("http_requests_total"));
    }
}
