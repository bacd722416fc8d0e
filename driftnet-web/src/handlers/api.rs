//! JSON API handlers for search and detail.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use driftnet_search::{DetailResponse, SearchError, SearchMode, SearchResponse};

use crate::server::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(msg: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": 400, "msg": msg })),
    )
}

fn internal(msg: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "code": 500, "msg": msg })),
    )
}

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text title query
    pub wd: Option<String>,
    /// Latency policy, `fast` or `full` (default)
    pub mode: Option<String>,
}

/// `GET /api/search?wd=<query>&mode=fast|full`
pub async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.wd.as_deref().unwrap_or("").trim();
    if query.is_empty() {
        return Err(bad_request("missing parameter wd"));
    }
    let mode = SearchMode::from_param(params.mode.as_deref().unwrap_or(""));

    match state.aggregator.search(query, mode).await {
        Ok(response) => Ok(Json(response)),
        Err(SearchError::EmptyQuery) => Err(bad_request("missing parameter wd")),
        Err(e) => {
            error!(error = %e, "search failed");
            Err(internal("search failed"))
        }
    }
}

/// Query parameters for `/api/detail`.
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    /// Source display name from a search result
    pub source: Option<String>,
    /// Source-local catalog entry id
    pub id: Option<String>,
}

/// `GET /api/detail?source=<name>&id=<id>`
pub async fn api_detail(
    State(state): State<AppState>,
    Query(params): Query<DetailParams>,
) -> Result<Json<DetailResponse>, ApiError> {
    let source = params.source.as_deref().unwrap_or("").trim();
    let id = params.id.as_deref().unwrap_or("").trim();
    if source.is_empty() || id.is_empty() {
        return Err(bad_request("missing source or id"));
    }

    match state.resolver.resolve(source, id).await {
        Ok(response) => Ok(Json(response)),
        Err(SearchError::UnknownSource { .. }) => Err(bad_request("unknown source")),
        Err(e) => {
            error!(error = %e, "detail resolution failed");
            Err(internal("detail fetch failed"))
        }
    }
}
