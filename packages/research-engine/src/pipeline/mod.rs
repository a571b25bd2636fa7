//! The research-to-report pipeline and its stages.

pub mod artifacts;
pub mod collect;
pub mod consolidate;
pub mod gate;
pub mod orchestrator;
pub mod parse;
pub mod progress;
pub mod prompts;
pub mod quality;
pub mod queries;
pub mod validate;

pub use artifacts::DerivedArtifactOrchestrator;
pub use collect::{dedup_and_rank, ResearchCollector};
pub use consolidate::{check_quality_score, consolidate, CoverageScorer, QualityScorer};
pub use orchestrator::ResearchPipeline;
pub use parse::{parse_analysis, strip_code_fences};
pub use progress::{PipelineStage, Progress, ProgressReporter, ProgressUpdate};
pub use prompts::{build_analysis_prompt, template_sha256, PROMPT_VERSION};
pub use quality::check_research_floor;
pub use queries::plan_queries;
pub use validate::{check_completeness, check_contamination, find_banned_token, BANNED_TOKENS};
