//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Base URL of the PocketBase server (default: http://127.0.0.1:8090).
    pub pocketbase_url: String,

    /// Timeout for each backend request (default: 30 seconds).
    pub backend_timeout: Duration,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let pocketbase_url =
            env::var("POCKETBASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());

        let backend_timeout = env::var("BACKEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            pocketbase_url,
            backend_timeout,
            cors_allowed_origins,
        })
    }

    /// Whether every origin is allowed.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_allowed_origins.len() == 1 && self.cors_allowed_origins[0] == "*"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            pocketbase_url: "http://127.0.0.1:8090".to_string(),
            backend_timeout: Duration::from_secs(30),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_any_origin() {
        assert!(Config::default().cors_allows_any());
        let config = Config {
            cors_allowed_origins: vec!["https://pix.example".to_string()],
            ..Config::default()
        };
        assert!(!config.cors_allows_any());
    }
}
