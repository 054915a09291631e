//! Sentiment Service
//!
//! Fetches subfeddit comments from the comments API, scores them with the
//! VADER lexicon and returns them sorted by polarity.

pub mod config;
pub mod feddit_client;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod scoring;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use feddit_client::{FedditClient, FetchError};
pub use handlers::AppState;
pub use models::{Classification, Comment, ScoredComment, SortOrder};
pub use scoring::{SentimentScorer, VaderScorer};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/v1/subfeddit/{subfeddit_id}/comments/sentiment",
            get(handlers::sentiment_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
