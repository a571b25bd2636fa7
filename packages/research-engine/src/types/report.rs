//! The final report, built once per successful run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnalysisRecord, AnalysisRequest, CorpusSummary, DerivedArtifacts};

/// Identifies this engine in report metadata.
pub const ANALYSIS_ENGINE: &str = concat!("research-engine/", env!("CARGO_PKG_VERSION"));

/// Everything merged before the final score gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDraft {
    pub request: AnalysisRequest,
    pub research: CorpusSummary,
    pub analysis: AnalysisRecord,
    pub artifacts: DerivedArtifacts,
}

/// Provenance and quality data attached to a finished report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_id: Uuid,
    pub processing_time_seconds: f64,
    /// `"{minutes}m {seconds}s"`.
    pub processing_time_formatted: String,
    pub analysis_engine: String,
    pub generated_at: DateTime<Utc>,
    pub quality_score: f64,
    /// Unique real sources behind the analysis.
    pub source_count: usize,
    /// Characters of extracted research text.
    pub total_content_analyzed: usize,
    pub model: String,
    pub prompt_version: String,
    pub prompt_sha256: String,
    /// Always true: a report only exists when every contamination gate passed.
    pub simulation_free: bool,
}

/// Format seconds as `"{m}m {s}s"`.
pub fn format_duration(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{}m {}s", whole / 60, whole % 60)
}

/// A complete, validated analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub request: AnalysisRequest,
    pub research: CorpusSummary,
    pub analysis: AnalysisRecord,
    pub artifacts: DerivedArtifacts,
    pub metadata: ReportMetadata,
}

impl FinalReport {
    pub(crate) fn finalize(draft: ReportDraft, metadata: ReportMetadata) -> Self {
        Self {
            request: draft.request,
            research: draft.research,
            analysis: draft.analysis,
            artifacts: draft.artifacts,
            metadata,
        }
    }
}
