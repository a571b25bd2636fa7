use axum::{extract::Extension, Json};
use extraction::ExtractionTest;
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    available_extractors: Vec<String>,
    test_extraction: ExtractionTest,
}

/// Health check endpoint
///
/// Runs one test extraction against the configured probe URL. Reports
/// `healthy` when at least one extractor is available and the probe
/// succeeded, `degraded` otherwise. Always 200: a degraded extractor still
/// serves requests.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let available_extractors: Vec<String> = state
        .extractor
        .available_extractors()
        .into_iter()
        .map(String::from)
        .collect();
    let probe = state.extractor.test_extraction(&state.health_check_url).await;

    let is_healthy = !available_extractors.is_empty() && probe.success;
    if !is_healthy {
        tracing::warn!(
            url = %state.health_check_url,
            error = probe.error.as_deref().unwrap_or(""),
            "Health probe degraded"
        );
    }

    Json(HealthResponse {
        status: if is_healthy { "healthy" } else { "degraded" }.to_string(),
        available_extractors,
        test_extraction: probe,
    })
}
