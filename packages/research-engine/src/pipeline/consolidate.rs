//! Consolidation and quality scoring.

use tracing::info;

use super::gate::ensure;
use crate::error::{FailureKind, PipelineResult};
use crate::types::{
    AnalysisRecord, AnalysisRequest, DerivedArtifacts, ReportDraft, ResearchCorpus,
    REQUIRED_SECTIONS,
};

/// Scores a consolidated draft on a 0-100 scale.
pub trait QualityScorer: Send + Sync {
    fn score(&self, draft: &ReportDraft) -> f64;
}

/// Default scorer: rewards section and artifact coverage plus the depth of
/// the underlying research.
///
/// | part              | points | rule                         |
/// |-------------------|--------|------------------------------|
/// | required sections | 40     | 5 per non-empty section      |
/// | artifacts         | 25     | 5 per non-empty artifact     |
/// | insights          | 15     | scaled to `full_insights`    |
/// | sources           | 10     | scaled to `full_sources`     |
/// | characters        | 10     | scaled to `full_chars`       |
#[derive(Debug, Clone)]
pub struct CoverageScorer {
    pub full_insights: usize,
    pub full_sources: usize,
    pub full_chars: usize,
}

impl Default for CoverageScorer {
    fn default() -> Self {
        Self {
            full_insights: 25,
            full_sources: 20,
            full_chars: 60_000,
        }
    }
}

fn ratio(value: usize, full: usize) -> f64 {
    if full == 0 {
        return 1.0;
    }
    (value as f64 / full as f64).min(1.0)
}

impl QualityScorer for CoverageScorer {
    fn score(&self, draft: &ReportDraft) -> f64 {
        let sections = REQUIRED_SECTIONS
            .iter()
            .filter(|s| draft.analysis.has_section(s))
            .count();
        let artifacts = draft.artifacts.present_count();

        let score = 5.0 * sections as f64
            + 5.0 * artifacts as f64
            + 15.0 * ratio(draft.analysis.insights().len(), self.full_insights)
            + 10.0 * ratio(draft.research.unique_sources, self.full_sources)
            + 10.0 * ratio(draft.research.total_char_count, self.full_chars);

        (score * 100.0).round() / 100.0
    }
}

/// Merge the validated pieces into one draft.
pub fn consolidate(
    request: &AnalysisRequest,
    corpus: &ResearchCorpus,
    analysis: AnalysisRecord,
    artifacts: DerivedArtifacts,
) -> ReportDraft {
    ReportDraft {
        request: request.clone(),
        research: corpus.summary(),
        analysis,
        artifacts,
    }
}

/// Score the draft and fail below `threshold`.
pub fn check_quality_score(
    scorer: &dyn QualityScorer,
    draft: &ReportDraft,
    threshold: f64,
) -> PipelineResult<f64> {
    let score = scorer.score(draft);
    info!(score, threshold, "Report scored");
    ensure(
        score >= threshold,
        FailureKind::ScoreFailure,
        format!("quality score {:.2} is below the threshold {:.2}", score, threshold),
    )?;
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::corpus_with;
    use crate::testing::fixtures::{analysis_record, artifacts};

    fn draft(insights: usize, sources: usize, chars_each: usize) -> ReportDraft {
        consolidate(
            &AnalysisRequest::new("fitness apps"),
            &corpus_with(sources, chars_each),
            analysis_record(insights),
            artifacts(),
        )
    }

    #[test]
    fn scores_reference_scenario_above_threshold() {
        // 40 + 25 + 15 * 0.8 + 10 * 0.5 + 10 * 31/60
        let score = CoverageScorer::default().score(&draft(20, 10, 3_100));
        assert!((score - 87.17).abs() < 1e-9, "{score}");
    }

    #[test]
    fn full_coverage_scores_one_hundred() {
        let score = CoverageScorer::default().score(&draft(30, 20, 3_000));
        assert_eq!(score, 100.0);
    }

    #[test]
    fn gate_fails_below_threshold() {
        let thin = draft(15, 10, 3_100);
        let err = check_quality_score(&CoverageScorer::default(), &thin, 85.0).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ScoreFailure);
        assert!(err.message().contains("84.17"));
    }

    #[test]
    fn gate_passes_at_threshold() {
        struct Fixed(f64);
        impl QualityScorer for Fixed {
            fn score(&self, _: &ReportDraft) -> f64 {
                self.0
            }
        }
        let score = check_quality_score(&Fixed(85.0), &draft(20, 10, 3_100), 85.0).unwrap();
        assert_eq!(score, 85.0);
    }
}
