//! Extractor diagnostics.
//!
//! GET  /api/extractor_stats
//! POST /api/extractor_stats/reset[?extractor=name]
//! GET  /api/test_extraction?url=...

use axum::{
    extract::{Extension, Query},
    Json,
};
use extraction::{ExtractionTest, StatsSnapshot};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    success: bool,
    stats: StatsSnapshot,
}

pub async fn extractor_stats_handler(Extension(state): Extension<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        success: true,
        stats: state.extractor.stats(),
    })
}

#[derive(Deserialize)]
pub struct ResetQuery {
    /// Strategy to reset; all strategies when absent.
    extractor: Option<String>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    success: bool,
    /// The strategy that was reset, or `"all"`.
    reset: String,
}

pub async fn reset_stats_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<ResetResponse>, ApiError> {
    let target = query.extractor.as_deref().map(str::trim).filter(|s| !s.is_empty());

    if !state.extractor.reset_extractor_stats(target) {
        return Err(ApiError::NotFound(format!(
            "unknown extractor: {}",
            target.unwrap_or_default()
        )));
    }

    tracing::info!(extractor = target.unwrap_or("all"), "Extractor statistics reset");
    Ok(Json(ResetResponse {
        success: true,
        reset: target.unwrap_or("all").to_string(),
    }))
}

#[derive(Deserialize)]
pub struct TestExtractionQuery {
    url: Option<String>,
}

#[derive(Serialize)]
pub struct TestExtractionResponse {
    success: bool,
    result: ExtractionTest,
}

pub async fn test_extraction_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<TestExtractionQuery>,
) -> Result<Json<TestExtractionResponse>, ApiError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("url query parameter is required".into()))?;

    let result = state.extractor.test_extraction(url.trim()).await;
    Ok(Json(TestExtractionResponse {
        success: result.success,
        result,
    }))
}
