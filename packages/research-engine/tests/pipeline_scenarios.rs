//! End-to-end pipeline runs against mock collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use research_engine::testing::fixtures::{analysis_json, artifact_output};
use research_engine::testing::{prose, MockArtifactGenerator, MockExtractor, MockModel, MockWebSearcher};
use research_engine::{
    AnalysisRequest, ArtifactGenerator, ArtifactKind, FailureKind, PipelineConfig, PipelineStage,
    ProgressUpdate, ResearchPipeline, SearchResult,
};
use serde_json::json;

struct Harness {
    model: Arc<MockModel>,
    generators: Vec<Arc<MockArtifactGenerator>>,
    extractor: Arc<MockExtractor>,
    pipeline: ResearchPipeline,
}

fn results(count: usize) -> Vec<SearchResult> {
    (0..count)
        .map(|i| {
            SearchResult::from_url(&format!("https://site{}.test/market", i), 0.95 - i as f64 * 0.02)
                .unwrap()
                .with_title(format!("Fitness market report {}", i + 1))
        })
        .collect()
}

fn harness(sources: usize, chars_each: usize, model: MockModel) -> Harness {
    let model = Arc::new(model);
    let generators: Vec<Arc<MockArtifactGenerator>> = ArtifactKind::ALL
        .into_iter()
        .map(|kind| Arc::new(MockArtifactGenerator::new(kind, artifact_output(kind))))
        .collect();
    let extractor = Arc::new(MockExtractor::new().with_default_page(prose(chars_each)));
    let searcher = MockWebSearcher::new().with_default_results(results(sources));

    let pipeline = ResearchPipeline::new(
        Arc::new(searcher),
        extractor.clone(),
        model.clone(),
        generators
            .iter()
            .map(|g| g.clone() as Arc<dyn ArtifactGenerator>)
            .collect(),
    )
    .with_config(PipelineConfig::default().with_inter_query_pause(Duration::ZERO));

    Harness {
        model,
        generators,
        extractor,
        pipeline,
    }
}

fn model_answering(insights: usize) -> MockModel {
    MockModel::new().with_response(analysis_json(insights).to_string())
}

fn fitness_apps() -> AnalysisRequest {
    AnalysisRequest::new("fitness apps")
}

#[tokio::test]
async fn ten_sources_and_twenty_insights_produce_a_report() {
    let h = harness(10, 3_100, model_answering(20));

    let report = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap();

    assert!(report.metadata.quality_score >= 85.0);
    assert_eq!(report.metadata.source_count, 10);
    assert_eq!(report.metadata.total_content_analyzed, 31_000);
    assert!(report.metadata.simulation_free);
    assert_eq!(report.metadata.model, "mock/analysis-1");
    assert_eq!(report.metadata.prompt_sha256.len(), 64);
    assert_eq!(report.metadata.report_id.get_version_num(), 7);
    assert_eq!(report.research.unique_sources, 10);
    assert_eq!(report.research.total_queries, 8);
    assert_eq!(report.artifacts.visual_proofs.len(), 5);

    assert_eq!(h.model.calls(), 1);
    let prompt = &h.model.prompts()[0];
    assert!(prompt.contains("- **Segment**: fitness apps"));
    assert!(prompt.contains("- **Product/Service**: not specified"));
    assert!(prompt.contains("https://site0.test/market"));
    assert!(h.generators.iter().all(|g| g.calls() == 1));
}

#[tokio::test]
async fn nine_sources_are_insufficient_and_the_model_is_never_called() {
    let h = harness(9, 4_000, model_answering(20));

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ResearchInsufficient);
    assert_eq!(failure.stage, PipelineStage::GateResearchQuality);
    assert!(failure.error.message().contains("9 unique sources"));
    assert_eq!(h.model.calls(), 0);
    assert!(h.generators.iter().all(|g| g.calls() == 0));
    // Every query still ran its extractions
    assert_eq!(h.extractor.calls().len(), 8 * 9);
}

#[tokio::test]
async fn fourteen_insights_fail_completeness() {
    let h = harness(20, 3_000, model_answering(14));

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::CompletenessFailure);
    assert_eq!(failure.stage, PipelineStage::GateAiResponse);
    assert!(h.generators.iter().all(|g| g.calls() == 0));
}

#[tokio::test]
async fn fifteen_insights_pass_with_deep_research() {
    let h = harness(20, 3_000, model_answering(15));

    let report = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap();

    assert_eq!(report.analysis.insights().len(), 15);
    assert!(report.metadata.quality_score >= 85.0);
}

#[tokio::test]
async fn fifteen_insights_on_thin_research_fail_the_score_gate() {
    let h = harness(10, 3_100, model_answering(15));

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ScoreFailure);
    assert_eq!(failure.stage, PipelineStage::GateQualityScore);
}

#[tokio::test]
async fn banned_token_anywhere_is_contamination() {
    let mut record = analysis_json(20);
    record["competitive_analysis"][0]["weaknesses"] = json!(["For Example, slow support"]);
    let h = harness(10, 3_100, MockModel::new().with_response(record.to_string()));

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ContaminationFailure);
    assert_eq!(failure.stage, PipelineStage::GateAiResponse);
    assert!(h.generators.iter().all(|g| g.calls() == 0));
}

#[tokio::test]
async fn invalid_json_is_a_parse_failure() {
    let h = harness(10, 3_100, MockModel::new().with_response("I could not complete the analysis."));

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ParseFailure);
    assert_eq!(failure.stage, PipelineStage::RunAiAnalysis);
}

#[tokio::test]
async fn fenced_response_is_accepted() {
    let fenced = format!("```json\n{}\n```", analysis_json(20));
    let h = harness(10, 3_100, MockModel::new().with_response(fenced));

    assert!(h.pipeline.generate_report(&fitness_apps(), None).await.is_ok());
}

#[tokio::test]
async fn model_failure_is_a_generation_failure() {
    let h = harness(10, 3_100, MockModel::failing());

    let failure = h.pipeline.generate_report(&fitness_apps(), None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::GenerationFailure);
    assert_eq!(failure.stage, PipelineStage::RunAiAnalysis);
}

#[tokio::test]
async fn invalid_request_fails_before_any_search() {
    let h = harness(10, 3_100, model_answering(20));
    let request = AnalysisRequest::new("fitness apps").with_price(-10.0);

    let failure = h.pipeline.generate_report(&request, None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::InputInvalid);
    assert!(h.extractor.calls().is_empty());
}

#[tokio::test]
async fn progress_visits_every_stage_in_order() {
    let h = harness(10, 3_100, model_answering(20));
    let seen = Mutex::new(Vec::new());
    let reporter = |update: &ProgressUpdate| {
        if update.detail.is_none() {
            seen.lock().unwrap().push(update.stage);
        }
    };

    h.pipeline
        .generate_report(&fitness_apps(), Some(&reporter))
        .await
        .unwrap();

    assert_eq!(seen.into_inner().unwrap(), PipelineStage::ALL.to_vec());
}

#[tokio::test]
async fn progress_reports_each_query() {
    let h = harness(10, 3_100, model_answering(20));
    let details = Mutex::new(Vec::new());
    let reporter = |update: &ProgressUpdate| {
        if update.stage == PipelineStage::CollectResearch {
            if let Some(detail) = &update.detail {
                details.lock().unwrap().push(detail.clone());
            }
        }
    };

    h.pipeline
        .generate_report(&fitness_apps(), Some(&reporter))
        .await
        .unwrap();

    let details = details.into_inner().unwrap();
    assert_eq!(details.len(), 8);
    assert_eq!(details[0], "query 1/8");
    assert_eq!(details[7], "query 8/8");
}

#[tokio::test]
async fn panicking_reporter_does_not_change_the_outcome() {
    let h = harness(10, 3_100, model_answering(20));
    let reporter = |_: &ProgressUpdate| panic!("progress sink closed");

    let report = h
        .pipeline
        .generate_report(&fitness_apps(), Some(&reporter))
        .await
        .unwrap();

    assert_eq!(report.metadata.source_count, 10);
}
