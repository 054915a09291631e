//! API request handlers for the Golden AMI service

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::{error::ResolveError, models::SelectionFilters, resolver::AmiResolver};

/// Shared application state
pub struct AppState {
    pub resolver: AmiResolver,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "detail": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => ApiError {
                status: StatusCode::NOT_FOUND,
                message: "No matching ami id found for provided parameters".to_string(),
            },
            ResolveError::Internal(reason) => {
                error!("Resolution failed: {}", reason);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                }
            }
            ResolveError::RetriesExhausted(reason) => {
                error!("Resolution throttled: {}", reason);
                ApiError {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "Service temporarily unavailable".to_string(),
                }
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: rejection.body_text(),
        }
    }
}

/// Query parameters of `GET /get_ami`
#[derive(Debug, Deserialize)]
pub struct GetAmiParams {
    pub kr_card: String,
    pub os_type: String,
    pub ami_flavour: String,
    pub region: String,
    pub account_id: String,
    pub imds_ver: String,
}

impl GetAmiParams {
    fn into_parts(self) -> (String, SelectionFilters) {
        (
            self.kr_card,
            SelectionFilters {
                platform: self.os_type,
                flavour: self.ami_flavour,
                region: self.region,
                account_id: self.account_id,
                imds_version: self.imds_ver,
            },
        )
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "Healthy"
    }))
}

/// Resolve the golden AMI id for the query parameters
pub async fn get_ami_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<GetAmiParams>, QueryRejection>,
) -> Result<Json<String>, ApiError> {
    let Query(params) = params?;
    let (card_id, filters) = params.into_parts();

    info!(
        "Resolving golden AMI for card {} (flavour {}, region {})",
        card_id, filters.flavour, filters.region
    );

    let image_id = state.resolver.resolve(&card_id, &filters).await?;
    Ok(Json(image_id))
}
