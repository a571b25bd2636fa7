//! Quality-Gated Market Research Pipeline
//!
//! Turns a business description into a market analysis report backed by
//! real web research, or fails loudly with a tagged reason.
//!
//! # Design Philosophy
//!
//! **"A real report or no report"**
//!
//! - Research is collected from the open web before any model call
//! - Thin research stops the run before the model is asked anything
//! - Model output with placeholder markers is rejected outright, never patched
//! - A report exists only when every gate passed; there is no partial result
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extraction::{CascadeConfig, ContentExtractor};
//! use research_engine::ai::{ModelArtifactGenerator, OpenAIModel};
//! use research_engine::{AnalysisRequest, ResearchPipeline, TavilyWebSearcher};
//!
//! let model = Arc::new(OpenAIModel::new(openai_key)?);
//! let pipeline = ResearchPipeline::new(
//!     Arc::new(TavilyWebSearcher::new(tavily_key)?),
//!     Arc::new(ContentExtractor::new(CascadeConfig::default())?),
//!     model.clone(),
//!     ModelArtifactGenerator::full_set(model),
//! );
//!
//! match pipeline.generate_report(&AnalysisRequest::new("fitness apps"), None).await {
//!     Ok(report) => println!("score {:.1}", report.metadata.quality_score),
//!     Err(failure) => eprintln!("{} ({})", failure, failure.kind()),
//! }
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - Stages, gates and the orchestrator
//! - [`types`] - Requests, corpus, records, reports and configuration
//! - [`traits`] - Search, extraction, generation and artifact seams
//! - [`ai`] - OpenAI backend and model-backed artifact generators
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ArtifactError, FailureKind, GenerationError, PipelineError, PipelineResult, SearchError,
    StageFailure,
};
pub use pipeline::{
    CoverageScorer, PipelineStage, ProgressReporter, ProgressUpdate, QualityScorer,
    ResearchPipeline,
};
pub use security::SecretString;
#[cfg(feature = "tavily")]
pub use traits::searcher::TavilyWebSearcher;
pub use traits::{ArtifactGenerator, GenerativeModel, PageExtractor, WebSearcher};
pub use types::{
    AnalysisRecord, AnalysisRequest, ArtifactKind, CorpusSummary, DerivedArtifacts, FinalReport,
    PipelineConfig, ReportMetadata, ResearchCorpus, ResearchSource, SearchResult,
};
