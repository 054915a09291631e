//! Sentiment Service
//!
//! REST API scoring subfeddit comments by sentiment

use anyhow::{Context, Result};
use sentiment_service::{create_router, AppState, Config, FedditClient, VaderScorer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    services_common::init_tracing("sentiment_service=debug,tower_http=debug")?;

    info!("Starting Sentiment Service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Comments API: {}", config.comments_url);
    info!("Listening on {}", config.address());

    let client = FedditClient::new(config.comments_url.clone(), config.upstream_timeout)?;

    // Create application state
    let state = AppState {
        client,
        scorer: Box::new(VaderScorer::new()),
    };

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .context("Failed to bind to address")?;

    info!("Sentiment Service running on http://{}", config.address());

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
