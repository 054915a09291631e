//! Golden AMI Service
//!
//! REST API resolving golden AMI ids for caller cards

use anyhow::{Context, Result};
use golden_ami_service::{
    create_router, AmiResolver, AmiStore, AppState, Config, DynamoStore, MemoryStore,
    StoreBackend,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    services_common::init_tracing("golden_ami_service=debug,tower_http=debug")?;

    info!("Starting Golden AMI Service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Listening on {}", config.address());

    let store: Arc<dyn AmiStore> = match config.backend {
        StoreBackend::DynamoDb => Arc::new(
            DynamoStore::connect(
                &config.region,
                config.dynamodb_endpoint.as_deref(),
                config.card_table.clone(),
                config.catalog_table.clone(),
                config.retry,
            )
            .await,
        ),
        StoreBackend::Memory => {
            warn!("Using in-memory store; card records are lost on restart");
            match &config.catalog_file {
                Some(path) => Arc::new(MemoryStore::from_catalog_file(path)?),
                None => Arc::new(MemoryStore::new()),
            }
        }
    };

    // Create application state
    let state = AppState {
        resolver: AmiResolver::new(store),
    };

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .context("Failed to bind to address")?;

    info!("Golden AMI Service running on http://{}", config.address());

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
