//! The research-to-report pipeline.
//!
//! A linear, fail-fast state machine:
//!
//! ```text
//! validate_input → collect_research → gate_research_quality → run_ai_analysis
//!   → gate_ai_response → generate_derived_artifacts → consolidate
//!   → gate_quality_score → done
//! ```
//!
//! Any stage failure ends the run with a [`StageFailure`]. There is no retry
//! and no degraded success: a [`FinalReport`] is built once, at the end, or
//! not at all.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::artifacts::DerivedArtifactOrchestrator;
use super::collect::ResearchCollector;
use super::consolidate::{check_quality_score, consolidate, CoverageScorer, QualityScorer};
use super::parse::parse_analysis;
use super::progress::{PipelineStage, Progress, ProgressReporter};
use super::prompts::{build_analysis_prompt, template_sha256, PROMPT_VERSION};
use super::quality::check_research_floor;
use super::queries::plan_queries;
use super::validate::{check_completeness, check_contamination};
use crate::error::{PipelineError, StageFailure};
use crate::traits::{ArtifactGenerator, GenerativeModel, PageExtractor, WebSearcher};
use crate::types::{
    format_duration, AnalysisRequest, FinalReport, PipelineConfig, ReportMetadata, ANALYSIS_ENGINE,
};

/// Tag a stage error with the stage it happened in.
fn at(stage: PipelineStage) -> impl FnOnce(PipelineError) -> StageFailure {
    move |err| {
        error!(stage = %stage, kind = %err.kind(), error = err.message(), "Pipeline stage failed");
        StageFailure::new(stage, err)
    }
}

/// Produces one [`FinalReport`] per request from web research and a
/// generative model.
pub struct ResearchPipeline {
    searcher: Arc<dyn WebSearcher>,
    extractor: Arc<dyn PageExtractor>,
    model: Arc<dyn GenerativeModel>,
    generators: Vec<Arc<dyn ArtifactGenerator>>,
    scorer: Arc<dyn QualityScorer>,
    config: PipelineConfig,
}

impl ResearchPipeline {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        extractor: Arc<dyn PageExtractor>,
        model: Arc<dyn GenerativeModel>,
        generators: Vec<Arc<dyn ArtifactGenerator>>,
    ) -> Self {
        Self {
            searcher,
            extractor,
            model,
            generators,
            scorer: Arc::new(CoverageScorer::default()),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`CoverageScorer`].
    pub fn with_scorer(mut self, scorer: Arc<dyn QualityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one request.
    ///
    /// `reporter` is notified at every stage boundary and during collection;
    /// its absence or failure never changes the outcome.
    pub async fn generate_report(
        &self,
        request: &AnalysisRequest,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<FinalReport, StageFailure> {
        let started = Instant::now();
        let progress = Progress::new(reporter);
        let config = &self.config;

        progress.stage(PipelineStage::ValidateInput, "Validating request");
        request.validate().map_err(at(PipelineStage::ValidateInput))?;
        info!(segment = request.segment(), "Starting market analysis");

        progress.stage(PipelineStage::CollectResearch, "Collecting web research");
        let queries = plan_queries(request, config.max_queries);
        let collector = ResearchCollector::new(
            self.searcher.clone(),
            self.extractor.clone(),
            config.clone(),
        );
        let corpus = collector.collect(&queries, progress).await;

        progress.stage(PipelineStage::GateResearchQuality, "Checking research depth");
        check_research_floor(&corpus, config).map_err(at(PipelineStage::GateResearchQuality))?;

        progress.stage(PipelineStage::RunAiAnalysis, "Running analysis model");
        let prompt = build_analysis_prompt(request, &corpus, config);
        info!(prompt_chars = prompt.chars().count(), "Analysis prompt built");
        let response = self
            .model
            .generate(&prompt, config.max_tokens)
            .await
            .map_err(PipelineError::from)
            .map_err(at(PipelineStage::RunAiAnalysis))?;
        let analysis = parse_analysis(&response).map_err(at(PipelineStage::RunAiAnalysis))?;

        progress.stage(PipelineStage::GateAiResponse, "Validating analysis");
        check_contamination(&analysis).map_err(at(PipelineStage::GateAiResponse))?;
        check_completeness(&analysis, config.min_insights)
            .map_err(at(PipelineStage::GateAiResponse))?;

        progress.stage(PipelineStage::GenerateDerivedArtifacts, "Generating derived artifacts");
        let orchestrator =
            DerivedArtifactOrchestrator::new(self.generators.clone(), config.min_visual_proofs);
        let artifacts = orchestrator
            .generate_all(&analysis, request, progress)
            .await
            .map_err(at(PipelineStage::GenerateDerivedArtifacts))?;

        progress.stage(PipelineStage::Consolidate, "Consolidating report");
        let draft = consolidate(request, &corpus, analysis, artifacts);

        progress.stage(PipelineStage::GateQualityScore, "Scoring report");
        let quality_score = check_quality_score(self.scorer.as_ref(), &draft, config.quality_threshold)
            .map_err(at(PipelineStage::GateQualityScore))?;

        let elapsed = started.elapsed().as_secs_f64();
        let metadata = ReportMetadata {
            report_id: Uuid::now_v7(),
            processing_time_seconds: elapsed,
            processing_time_formatted: format_duration(elapsed),
            analysis_engine: ANALYSIS_ENGINE.to_string(),
            generated_at: Utc::now(),
            quality_score,
            source_count: corpus.unique_sources(),
            total_content_analyzed: corpus.total_char_count,
            model: self.model.model_tag(),
            prompt_version: PROMPT_VERSION.to_string(),
            prompt_sha256: template_sha256().to_string(),
            simulation_free: true,
        };
        let report = FinalReport::finalize(draft, metadata);

        progress.stage(PipelineStage::Done, "Report ready");
        info!(
            report_id = %report.metadata.report_id,
            score = quality_score,
            sources = report.metadata.source_count,
            elapsed = %report.metadata.processing_time_formatted,
            "Market analysis complete"
        );
        Ok(report)
    }
}
