//! Pipeline stages and progress reporting.
//!
//! Progress is advisory: a missing reporter, or one that panics, never
//! changes the outcome of a run.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

/// States of the linear, fail-fast pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ValidateInput,
    CollectResearch,
    GateResearchQuality,
    RunAiAnalysis,
    GateAiResponse,
    GenerateDerivedArtifacts,
    Consolidate,
    GateQualityScore,
    Done,
}

impl PipelineStage {
    /// Stages in execution order.
    pub const ALL: [PipelineStage; 9] = [
        Self::ValidateInput,
        Self::CollectResearch,
        Self::GateResearchQuality,
        Self::RunAiAnalysis,
        Self::GateAiResponse,
        Self::GenerateDerivedArtifacts,
        Self::Consolidate,
        Self::GateQualityScore,
        Self::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateInput => "validate_input",
            Self::CollectResearch => "collect_research",
            Self::GateResearchQuality => "gate_research_quality",
            Self::RunAiAnalysis => "run_ai_analysis",
            Self::GateAiResponse => "gate_ai_response",
            Self::GenerateDerivedArtifacts => "generate_derived_artifacts",
            Self::Consolidate => "consolidate",
            Self::GateQualityScore => "gate_quality_score",
            Self::Done => "done",
        }
    }

    /// 1-based position in [`PipelineStage::ALL`].
    pub fn step(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).map_or(0, |i| i + 1)
    }

    /// The stage that follows this one; `None` after `Done`.
    pub fn next(&self) -> Option<PipelineStage> {
        Self::ALL.get(self.step()).copied()
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub step: usize,
    pub total_steps: usize,
    pub message: String,
    /// Finer-grained detail such as "query 3/8".
    pub detail: Option<String>,
}

/// Receives progress notifications.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Optional reporter wrapper that isolates reporter failures.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    reporter: Option<&'a dyn ProgressReporter>,
}

impl<'a> Progress<'a> {
    pub fn new(reporter: Option<&'a dyn ProgressReporter>) -> Self {
        Self { reporter }
    }

    /// A reporter that drops every update.
    pub fn silent() -> Self {
        Self { reporter: None }
    }

    pub fn stage(&self, stage: PipelineStage, message: impl Into<String>) {
        self.emit(stage, message.into(), None);
    }

    pub fn detail(&self, stage: PipelineStage, message: impl Into<String>, detail: impl Into<String>) {
        self.emit(stage, message.into(), Some(detail.into()));
    }

    fn emit(&self, stage: PipelineStage, message: String, detail: Option<String>) {
        let Some(reporter) = self.reporter else {
            return;
        };
        let update = ProgressUpdate {
            stage,
            step: stage.step(),
            total_steps: PipelineStage::ALL.len(),
            message,
            detail,
        };
        if catch_unwind(AssertUnwindSafe(|| reporter.report(&update))).is_err() {
            warn!(stage = %stage, "Progress reporter panicked; continuing");
        }
    }
}
