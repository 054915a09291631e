//! Configuration management for the sentiment service

use anyhow::{Context, Result};
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Upstream comments endpoint
    pub comments_url: String,

    /// Per-request timeout for the comments API
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            host: var_or("SENTIMENT_HOST", "0.0.0.0"),
            port: var_or("SENTIMENT_PORT", "5000")
                .parse()
                .context("Invalid SENTIMENT_PORT")?,
            comments_url: var_or("SUBFEDDIT_API_URL", "http://127.0.0.1:8080/api/v1/comments"),
            upstream_timeout: Duration::from_secs(
                var_or("UPSTREAM_TIMEOUT_SECS", "10")
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_SECS")?,
            ),
        };

        if config.port == 0 {
            anyhow::bail!("SENTIMENT_PORT must be greater than 0");
        }
        if config.comments_url.is_empty() {
            anyhow::bail!("SUBFEDDIT_API_URL must not be empty");
        }

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
