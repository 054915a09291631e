//! Client for the subfeddit comments API

use anyhow::{Context, Result};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Comment, CommentsPage};

/// Failure to obtain comments from upstream
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Subfeddit not found (upstream status {0})")]
    NotFound(reqwest::StatusCode),

    #[error("Comments API unavailable: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Client for interacting with the comments API
pub struct FedditClient {
    comments_url: String,
    client: reqwest::Client,
}

impl FedditClient {
    /// Create a new client for the comments endpoint
    pub fn new(comments_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            comments_url,
            client,
        })
    }

    /// Fetch one page of comments for a subfeddit
    pub async fn fetch_comments(
        &self,
        subfeddit_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Comment>, FetchError> {
        debug!(
            "Fetching comments from {} (subfeddit {}, skip {}, limit {})",
            self.comments_url, subfeddit_id, skip, limit
        );

        let response = self
            .client
            .get(&self.comments_url)
            .query(&[
                ("subfeddit_id", subfeddit_id.to_string()),
                ("skip", skip.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Comments API returned {} for subfeddit {}",
                response.status(),
                subfeddit_id
            );
            return Err(FetchError::NotFound(response.status()));
        }

        let page: CommentsPage = response.json().await?;
        Ok(page.comments)
    }
}
