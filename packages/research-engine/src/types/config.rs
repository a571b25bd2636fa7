//! Configuration for the research pipeline.

use std::time::Duration;

/// Configuration for the research-to-report pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum planned search queries. Default: 12.
    pub max_queries: usize,

    /// Results requested per query, and results extracted per query.
    /// Default: 15.
    pub results_per_query: usize,

    /// Extracted pages shorter than this are discarded. Default: 500.
    pub min_page_chars: usize,

    /// Pause between consecutive queries (rate limiting). Default: 1 s.
    pub inter_query_pause: Duration,

    /// Research floor: total extracted characters. Default: 30 000.
    pub min_total_chars: usize,

    /// Research floor: unique sources. Default: 10.
    pub min_unique_sources: usize,

    /// Sources included in the analysis prompt. Default: 15.
    pub prompt_top_sources: usize,

    /// Per-source excerpt length in the prompt. Default: 2 000.
    pub excerpt_chars: usize,

    /// Ceiling for the whole research context in the prompt. Default: 15 000.
    pub max_context_chars: usize,

    /// Token budget for the analysis call. Default: 8 192.
    pub max_tokens: u32,

    /// Minimum insight entries in the record. Default: 15.
    pub min_insights: usize,

    /// Final quality gate. Default: 85.0.
    pub quality_threshold: f64,

    /// Minimum visual proofs. Default: 5.
    pub min_visual_proofs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_queries: 12,
            results_per_query: 15,
            min_page_chars: 500,
            inter_query_pause: Duration::from_secs(1),
            min_total_chars: 30_000,
            min_unique_sources: 10,
            prompt_top_sources: 15,
            excerpt_chars: 2_000,
            max_context_chars: 15_000,
            max_tokens: 8_192,
            min_insights: 15,
            quality_threshold: 85.0,
            min_visual_proofs: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause between queries.
    pub fn with_inter_query_pause(mut self, pause: Duration) -> Self {
        self.inter_query_pause = pause;
        self
    }

    /// Set the results requested per query.
    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = n;
        self
    }

    /// Set the research floor.
    pub fn with_research_floor(mut self, min_total_chars: usize, min_unique_sources: usize) -> Self {
        self.min_total_chars = min_total_chars;
        self.min_unique_sources = min_unique_sources;
        self
    }

    /// Set the final quality threshold.
    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Set the token budget for the analysis call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
