//! Typed errors for the research engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Every pipeline failure carries a [`FailureKind`] tag so callers can react
//! to the category without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::PipelineStage;
use crate::types::ArtifactKind;

/// Category of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    FetchFailure,
    ExtractionFailure,
    ResearchInsufficient,
    GenerationFailure,
    ParseFailure,
    ContaminationFailure,
    CompletenessFailure,
    ArtifactFailure,
    ScoreFailure,
    InputInvalid,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailure => "FETCH_FAILURE",
            Self::ExtractionFailure => "EXTRACTION_FAILURE",
            Self::ResearchInsufficient => "RESEARCH_INSUFFICIENT",
            Self::GenerationFailure => "GENERATION_FAILURE",
            Self::ParseFailure => "PARSE_FAILURE",
            Self::ContaminationFailure => "CONTAMINATION_FAILURE",
            Self::CompletenessFailure => "COMPLETENESS_FAILURE",
            Self::ArtifactFailure => "ARTIFACT_FAILURE",
            Self::ScoreFailure => "SCORE_FAILURE",
            Self::InputInvalid => "INPUT_INVALID",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal (or, for fetch/extraction, per-attempt) pipeline failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    FetchFailure(String),

    #[error("extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("research insufficient: {0}")]
    ResearchInsufficient(String),

    #[error("generation failed: {0}")]
    GenerationFailure(String),

    #[error("model response is not valid JSON: {0}")]
    ParseFailure(String),

    #[error("record contains simulated content: {0}")]
    ContaminationFailure(String),

    #[error("record incomplete: {0}")]
    CompletenessFailure(String),

    #[error("derived artifact failed: {0}")]
    ArtifactFailure(String),

    #[error("quality score too low: {0}")]
    ScoreFailure(String),

    #[error("invalid input: {0}")]
    InputInvalid(String),
}

impl PipelineError {
    /// Build an error of the given kind.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            FailureKind::FetchFailure => Self::FetchFailure(message),
            FailureKind::ExtractionFailure => Self::ExtractionFailure(message),
            FailureKind::ResearchInsufficient => Self::ResearchInsufficient(message),
            FailureKind::GenerationFailure => Self::GenerationFailure(message),
            FailureKind::ParseFailure => Self::ParseFailure(message),
            FailureKind::ContaminationFailure => Self::ContaminationFailure(message),
            FailureKind::CompletenessFailure => Self::CompletenessFailure(message),
            FailureKind::ArtifactFailure => Self::ArtifactFailure(message),
            FailureKind::ScoreFailure => Self::ScoreFailure(message),
            FailureKind::InputInvalid => Self::InputInvalid(message),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::FetchFailure(_) => FailureKind::FetchFailure,
            Self::ExtractionFailure(_) => FailureKind::ExtractionFailure,
            Self::ResearchInsufficient(_) => FailureKind::ResearchInsufficient,
            Self::GenerationFailure(_) => FailureKind::GenerationFailure,
            Self::ParseFailure(_) => FailureKind::ParseFailure,
            Self::ContaminationFailure(_) => FailureKind::ContaminationFailure,
            Self::CompletenessFailure(_) => FailureKind::CompletenessFailure,
            Self::ArtifactFailure(_) => FailureKind::ArtifactFailure,
            Self::ScoreFailure(_) => FailureKind::ScoreFailure,
            Self::InputInvalid(_) => FailureKind::InputInvalid,
        }
    }

    /// The diagnostic message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::FetchFailure(m)
            | Self::ExtractionFailure(m)
            | Self::ResearchInsufficient(m)
            | Self::GenerationFailure(m)
            | Self::ParseFailure(m)
            | Self::ContaminationFailure(m)
            | Self::CompletenessFailure(m)
            | Self::ArtifactFailure(m)
            | Self::ScoreFailure(m)
            | Self::InputInvalid(m) => m,
        }
    }
}

impl From<extraction::ExtractError> for PipelineError {
    fn from(err: extraction::ExtractError) -> Self {
        match err {
            extraction::ExtractError::Fetch(e) => Self::FetchFailure(e.to_string()),
            e @ extraction::ExtractError::Exhausted { .. } => Self::ExtractionFailure(e.to_string()),
        }
    }
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        Self::GenerationFailure(err.to_string())
    }
}

impl From<ArtifactError> for PipelineError {
    fn from(err: ArtifactError) -> Self {
        Self::ArtifactFailure(err.to_string())
    }
}

/// The terminal state of a failed `generate_report` run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: PipelineError,
}

impl StageFailure {
    pub fn new(stage: PipelineStage, error: PipelineError) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

/// Errors from a search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered with an error status
    #[error("search API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body could not be decoded
    #[error("invalid search response: {0}")]
    Decode(String),
}

/// Errors from the generative model gateway.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered with an error status
    #[error("model API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider returned no text
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from a derived-artifact generator.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{kind}: {source}")]
    Generation {
        kind: ArtifactKind,
        #[source]
        source: GenerationError,
    },

    #[error("{kind}: output is not valid JSON: {reason}")]
    Parse { kind: ArtifactKind, reason: String },

    #[error("{kind}: {reason}")]
    Contract { kind: ArtifactKind, reason: String },

    #[error("{kind}: {reason}")]
    Failed { kind: ArtifactKind, reason: String },
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type alias for search operations.
pub type SearchResultSet<T> = std::result::Result<T, SearchError>;

/// Result type alias for model calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type alias for artifact generation.
pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_constructor() {
        for kind in [
            FailureKind::FetchFailure,
            FailureKind::ResearchInsufficient,
            FailureKind::ContaminationFailure,
            FailureKind::InputInvalid,
        ] {
            let err = PipelineError::new(kind, "boom");
            assert_eq!(err.kind(), kind);
            assert_eq!(err.message(), "boom");
        }
    }

    #[test]
    fn kind_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&FailureKind::ResearchInsufficient).unwrap();
        assert_eq!(json, "\"RESEARCH_INSUFFICIENT\"");
        assert_eq!(FailureKind::ScoreFailure.to_string(), "SCORE_FAILURE");
    }

    #[test]
    fn stage_failure_names_stage_and_reason() {
        let failure = StageFailure::new(
            PipelineStage::GateResearchQuality,
            PipelineError::ResearchInsufficient("9 < 10 sources".into()),
        );
        assert_eq!(failure.kind(), FailureKind::ResearchInsufficient);
        assert_eq!(
            failure.to_string(),
            "gate_research_quality failed: research insufficient: 9 < 10 sources"
        );
    }
}
