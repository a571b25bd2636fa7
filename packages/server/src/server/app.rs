//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use extraction::{CascadeConfig, ContentExtractor};
use research_engine::ai::{ModelArtifactGenerator, OpenAIModel};
use research_engine::{GenerativeModel, PipelineConfig, ResearchPipeline, TavilyWebSearcher};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{
    analyze_handler, extractor_stats_handler, health_handler, reset_stats_handler,
    test_extraction_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Process-wide extractor; its statistics are shared by every request.
    pub extractor: Arc<ContentExtractor>,
    pub pipeline: Arc<ResearchPipeline>,
    pub health_check_url: String,
}

impl AppState {
    /// Wire the real HTTP-backed collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = Arc::new(
            ContentExtractor::new(CascadeConfig::default().with_fetch_timeout(config.fetch_timeout))
                .context("Failed to create content extractor")?,
        );

        let mut model = OpenAIModel::new(config.openai_api_key.clone())
            .and_then(|model| model.with_timeout(config.model_timeout))
            .context("Failed to create OpenAI client")?
            .with_model(&config.openai_model);
        if let Some(base_url) = &config.openai_base_url {
            model = model.with_base_url(base_url);
        }
        let model: Arc<dyn GenerativeModel> = Arc::new(model);

        let searcher = TavilyWebSearcher::new(config.tavily_api_key.clone())
            .and_then(|searcher| searcher.with_timeout(config.search_timeout))
            .context("Failed to create Tavily client")?;

        let pipeline = ResearchPipeline::new(
            Arc::new(searcher),
            extractor.clone(),
            model.clone(),
            ModelArtifactGenerator::full_set(model),
        )
        .with_config(PipelineConfig::default().with_inter_query_pause(config.inter_query_pause));

        Ok(Self {
            extractor,
            pipeline: Arc::new(pipeline),
            health_check_url: config.health_check_url.clone(),
        })
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    tracing::info!(
        extractors = ?state.extractor.available_extractors(),
        "Available extractors"
    );

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/extractor_stats", get(extractor_stats_handler))
        .route("/api/extractor_stats/reset", post(reset_stats_handler))
        .route("/api/test_extraction", get(test_extraction_handler))
        .route("/api/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
