//! Report generation.
//!
//! POST /api/analyze
//!
//! Runs the whole pipeline for one request. A gate failure is answered with
//! 422 and the failure tag; there is never a partial report.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use research_engine::{AnalysisRequest, FailureKind, PipelineStage, StageFailure};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct AnalysisFailure {
    success: bool,
    kind: FailureKind,
    stage: PipelineStage,
    error: String,
}

impl From<StageFailure> for AnalysisFailure {
    fn from(failure: StageFailure) -> Self {
        Self {
            success: false,
            kind: failure.kind(),
            stage: failure.stage,
            error: failure.error.message().to_string(),
        }
    }
}

pub async fn analyze_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    tracing::info!(segment = request.segment(), "Analysis requested");

    match state.pipeline.generate_report(&request, None).await {
        Ok(report) => Json(report).into_response(),
        Err(failure) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(AnalysisFailure::from(failure))).into_response()
        }
    }
}
