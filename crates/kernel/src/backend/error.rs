//! Backend client errors.

use thiserror::Error;

/// Errors returned by a [`RecordStore`](super::RecordStore).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("record not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    /// A newer request with the same request key superseded this one.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    #[error("failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Map an HTTP status and error body to a backend error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => BackendError::NotFound,
            401 | 403 => BackendError::Unauthorized,
            _ => BackendError::Status {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Http(_) => "http",
            BackendError::Status { .. } => "status",
            BackendError::NotFound => "not_found",
            BackendError::Unauthorized => "unauthorized",
            BackendError::Cancelled(_) => "cancelled",
            BackendError::Decode(_) => "decode",
            BackendError::Url(_) => "url",
        }
    }
}

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(BackendError::from_status(404, "missing").is_not_found());
        assert!(matches!(
            BackendError::from_status(403, "nope"),
            BackendError::Unauthorized
        ));
        assert!(matches!(
            BackendError::from_status(400, "bad filter"),
            BackendError::Status { status: 400, .. }
        ));
    }
}
