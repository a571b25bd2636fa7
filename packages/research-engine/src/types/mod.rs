//! Data types for requests, research, analysis records and reports.

pub mod analysis;
pub mod config;
pub mod report;
pub mod request;
pub mod research;

pub use analysis::{
    is_empty_value, AnalysisRecord, ArtifactKind, DerivedArtifacts, INSIGHTS_SECTION,
    REQUIRED_SECTIONS,
};
pub use config::PipelineConfig;
pub use report::{format_duration, FinalReport, ReportDraft, ReportMetadata, ANALYSIS_ENGINE};
pub use request::AnalysisRequest;
pub use research::{
    CorpusSummary, FailedQuery, ResearchCorpus, ResearchSource, SearchResult, SourceRef,
};
