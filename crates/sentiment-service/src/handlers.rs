//! API request handlers for the sentiment service

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    feddit_client::{FedditClient, FetchError},
    models::{ScoredComment, SentimentParams, SortOrder},
    pipeline::{score_comments, TimeRange},
    scoring::SentimentScorer,
};

/// Shared application state
pub struct AppState {
    pub client: FedditClient,
    pub scorer: Box<dyn SentimentScorer>,
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
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => ApiError {
                status: StatusCode::NOT_FOUND,
                message: "Subfeddit not found".to_string(),
            },
            FetchError::Upstream(e) => {
                error!("Comments API request failed: {}", e);
                ApiError {
                    status: StatusCode::BAD_GATEWAY,
                    message: "Upstream comments API unavailable".to_string(),
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

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sentiment-service"
    }))
}

/// Score recent comments of a subfeddit
pub async fn sentiment_handler(
    State(state): State<Arc<AppState>>,
    Path(subfeddit_id): Path<String>,
    params: Result<Query<SentimentParams>, QueryRejection>,
) -> Result<Json<Vec<ScoredComment>>, ApiError> {
    let Query(params) = params?;
    info!(
        "Scoring comments for subfeddit {} (skip {}, limit {}, sort {})",
        subfeddit_id, params.skip, params.limit, params.sort
    );

    let comments = state
        .client
        .fetch_comments(&subfeddit_id, params.skip, params.limit)
        .await?;

    let range = TimeRange::from_params(params.start_time.as_deref(), params.end_time.as_deref());
    let scored = score_comments(
        comments,
        &range,
        state.scorer.as_ref(),
        SortOrder::from_param(&params.sort),
        params.limit,
    );

    Ok(Json(scored))
}
