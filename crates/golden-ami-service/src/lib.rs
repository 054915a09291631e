//! Golden AMI Service
//!
//! Resolves golden AMI ids from a catalog table by platform, flavour, region,
//! account and IMDS version, pinning each caller card to the base image
//! lineage of its first resolution.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod storage;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, StoreBackend};
pub use error::{ResolveError, StoreError};
pub use handlers::AppState;
pub use models::{CardBaseRecord, CatalogEntry, SelectionFilters};
pub use resolver::AmiResolver;
pub use storage::{AmiStore, DynamoStore, MemoryStore};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/healthy", get(handlers::health_handler))
        .route("/get_ami", get(handlers::get_ami_handler))
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
