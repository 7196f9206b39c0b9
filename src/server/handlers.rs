use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::error::{ApiError, Result};
use super::AppState;
use crate::fetcher::BatchResult;
use crate::github::FetchResult;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /github/fetch `{"url": "..."}`
pub async fn fetch_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<FetchResult>> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let url = body
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required and must be a string".to_string()))?;

    let result = state.fetcher.fetch_one(url).await.map_err(|e| {
        warn!(url = %url, error = %e, "fetch request failed");
        ApiError::from(e)
    })?;
    Ok(Json(result))
}

/// POST /github/fetch-batch `{"urls": ["...", ...]}`
pub async fn fetch_batch_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchResult>> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let urls = batch_urls(&body)?;
    let result = state.fetcher.fetch_batch(&urls).await?;
    Ok(Json(result))
}

fn batch_urls(body: &Value) -> Result<Vec<String>> {
    let items = body
        .get("urls")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("urls is required and must be a non-empty array".to_string())
        })?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("All URLs must be strings".to_string()))
        })
        .collect()
}
