//! HTTP middleware components.
//!
//! Resolves the viewer's session and records request metrics.

pub mod metrics;
pub mod session;

pub use metrics::record_metrics;
pub use session::{bearer_token, resolve_session};
