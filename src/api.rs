use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::error::LookupError;
use crate::service::LiveScores;

pub const CACHE_HEADER: &str = "x-cache";
const MAX_MATCH_ID_LEN: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub scores: Arc<LiveScores>,
}

impl AppState {
    pub fn new(scores: LiveScores) -> Self {
        Self {
            scores: Arc::new(scores),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/live-score", get(live_score))
        .route("/live-score/{match_id}", get(live_score_by_id))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Client-facing failures. Bodies are generic; details stay in the logs.
#[derive(Debug)]
pub enum ApiError {
    InvalidMatchId,
    NotFound,
    Upstream { retry_after_secs: u64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidMatchId => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "invalid match id",
                }),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody { error: "not found" }),
            )
                .into_response(),
            ApiError::Upstream { retry_after_secs } => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(ErrorBody {
                    error: "live score sources are unavailable, try again shortly",
                }),
            )
                .into_response(),
        }
    }
}

fn is_valid_match_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_MATCH_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

async fn live_score(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cached = state
        .scores
        .get_matches()
        .await
        .map_err(|_| ApiError::Upstream {
            retry_after_secs: state.scores.cache_ttl_secs(),
        })?;
    Ok((
        [(CACHE_HEADER, cached.status.as_str())],
        Json(cached.value.as_slice()),
    )
        .into_response())
}

async fn live_score_by_id(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Response, ApiError> {
    if !is_valid_match_id(&match_id) {
        return Err(ApiError::InvalidMatchId);
    }
    let (record, status) = state
        .scores
        .get_match(&match_id)
        .await
        .map_err(|e| match e {
            LookupError::NotFound => ApiError::NotFound,
            LookupError::Upstream(_) => ApiError::Upstream {
                retry_after_secs: state.scores.cache_ttl_secs(),
            },
        })?;
    Ok(([(CACHE_HEADER, status.as_str())], Json(record)).into_response())
}
