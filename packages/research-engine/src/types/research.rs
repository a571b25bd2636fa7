//! Search results and the research corpus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A discovered URL from web search with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The discovered URL.
    pub url: Url,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,

    /// Relevance score assigned by the search provider. Higher is better.
    pub relevance_score: f64,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new(url: Url, relevance_score: f64) -> Self {
        Self {
            url,
            title: None,
            snippet: None,
            relevance_score,
        }
    }

    /// Create from a URL string.
    pub fn from_url(url: &str, relevance_score: f64) -> Option<Self> {
        Url::parse(url).ok().map(|u| Self::new(u, relevance_score))
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// One extracted page in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSource {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Full extracted text.
    pub content: String,
    pub char_count: usize,
    pub relevance_score: f64,
    /// The query whose result produced this entry.
    pub query: String,
    /// Extraction strategy that produced the text.
    pub strategy: String,
}

/// A query that produced no usable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedQuery {
    pub query: String,
    pub reason: String,
}

/// Deduplicated, ranked research for one request.
///
/// Holds exactly one source per URL (the highest-scored), sorted by
/// descending relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchCorpus {
    /// Queries in the order they ran.
    pub queries: Vec<String>,
    pub sources: Vec<ResearchSource>,
    /// Sum of `char_count` over `sources`.
    pub total_char_count: usize,
    /// Search results seen across all queries, before filtering.
    pub total_results: usize,
    pub failed_queries: Vec<FailedQuery>,
    pub collected_at: DateTime<Utc>,
}

impl ResearchCorpus {
    pub fn unique_sources(&self) -> usize {
        self.sources.len()
    }

    /// The `n` most relevant sources.
    pub fn top(&self, n: usize) -> &[ResearchSource] {
        &self.sources[..n.min(self.sources.len())]
    }

    /// Compact view without page text, for reports.
    pub fn summary(&self) -> CorpusSummary {
        CorpusSummary {
            queries: self.queries.clone(),
            total_queries: self.queries.len(),
            total_results: self.total_results,
            unique_sources: self.unique_sources(),
            total_char_count: self.total_char_count,
            failed_queries: self.failed_queries.clone(),
            sources: self
                .sources
                .iter()
                .map(|s| SourceRef {
                    url: s.url.clone(),
                    title: s.title.clone(),
                    relevance_score: s.relevance_score,
                    char_count: s.char_count,
                    query: s.query.clone(),
                })
                .collect(),
            collected_at: self.collected_at,
        }
    }
}

/// A source as it appears in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub title: String,
    pub relevance_score: f64,
    pub char_count: usize,
    pub query: String,
}

/// Research provenance carried into the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub queries: Vec<String>,
    pub total_queries: usize,
    pub total_results: usize,
    pub unique_sources: usize,
    pub total_char_count: usize,
    pub failed_queries: Vec<FailedQuery>,
    pub sources: Vec<SourceRef>,
    pub collected_at: DateTime<Utc>,
}
