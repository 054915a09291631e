//! Configuration management for the Golden AMI service
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) once at startup.

use anyhow::{Context, Result};
use services_common::RetryPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which table store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown AMI_STORE_BACKEND: {}", other),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Card → base AMI table
    pub card_table: String,

    /// Golden AMI catalog table
    pub catalog_table: String,

    /// AWS region of both tables
    pub region: String,

    pub backend: StoreBackend,

    /// Override for local DynamoDB
    pub dynamodb_endpoint: Option<String>,

    /// JSON catalog seed for the memory backend
    pub catalog_file: Option<PathBuf>,

    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend: StoreBackend = var_or("AMI_STORE_BACKEND", "dynamodb").parse()?;

        let retry = RetryPolicy::new(
            var_or("STORE_RETRY_MAX_ATTEMPTS", "5")
                .parse()
                .context("Invalid STORE_RETRY_MAX_ATTEMPTS")?,
            Duration::from_millis(
                var_or("STORE_RETRY_BASE_DELAY_MS", "100")
                    .parse()
                    .context("Invalid STORE_RETRY_BASE_DELAY_MS")?,
            ),
            Duration::from_millis(
                var_or("STORE_RETRY_MAX_DELAY_MS", "5000")
                    .parse()
                    .context("Invalid STORE_RETRY_MAX_DELAY_MS")?,
            ),
        )
        .context("Invalid store retry settings")?;

        let config = Config {
            host: var_or("AMI_HOST", "0.0.0.0"),
            port: var_or("AMI_PORT", "8000")
                .parse()
                .context("Invalid AMI_PORT")?,
            card_table: lookup("KR_CARD_TABLE").unwrap_or_default(),
            catalog_table: lookup("GOLDEN_AMI_TABLE").unwrap_or_default(),
            region: var_or("REGION", "us-east-1"),
            backend,
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT_URL").filter(|v| !v.is_empty()),
            catalog_file: lookup("AMI_CATALOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            retry,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("AMI_PORT must be greater than 0");
        }

        if self.backend == StoreBackend::DynamoDb {
            if self.card_table.is_empty() {
                anyhow::bail!("KR_CARD_TABLE must be set");
            }
            if self.catalog_table.is_empty() {
                anyhow::bail!("GOLDEN_AMI_TABLE must be set");
            }
        }

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
