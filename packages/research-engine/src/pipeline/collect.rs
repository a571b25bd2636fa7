//! Research collection.
//!
//! Queries run one after another with a fixed pause between them. For each
//! query the searcher's results are extracted in order; pages below the
//! minimum size are dropped silently. A query that yields nothing usable is
//! recorded as failed and collection moves on.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::progress::{PipelineStage, Progress};
use crate::traits::{PageExtractor, WebSearcher};
use crate::types::{FailedQuery, PipelineConfig, ResearchCorpus, ResearchSource};

/// Runs search + extraction for a list of queries.
pub struct ResearchCollector {
    searcher: Arc<dyn WebSearcher>,
    extractor: Arc<dyn PageExtractor>,
    config: PipelineConfig,
}

impl ResearchCollector {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        extractor: Arc<dyn PageExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            searcher,
            extractor,
            config,
        }
    }

    /// Collect, deduplicate and rank research for `queries`.
    pub async fn collect(&self, queries: &[String], progress: Progress<'_>) -> ResearchCorpus {
        let mut pages: Vec<ResearchSource> = Vec::new();
        let mut failed_queries = Vec::new();
        let mut total_results = 0;

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.config.inter_query_pause.is_zero() {
                tokio::time::sleep(self.config.inter_query_pause).await;
            }
            progress.detail(
                PipelineStage::CollectResearch,
                format!("Searching: {}", query),
                format!("query {}/{}", i + 1, queries.len()),
            );

            match self.collect_query(query, &mut total_results).await {
                Ok(found) => {
                    info!(query = %query, pages = found.len(), "Query collected");
                    pages.extend(found);
                }
                Err(reason) => {
                    warn!(query = %query, reason = %reason, "Query produced no usable pages");
                    failed_queries.push(FailedQuery {
                        query: query.clone(),
                        reason,
                    });
                }
            }
        }

        let sources = dedup_and_rank(pages);
        let total_char_count = sources.iter().map(|s| s.char_count).sum();

        info!(
            queries = queries.len(),
            failed = failed_queries.len(),
            sources = sources.len(),
            chars = total_char_count,
            "Research collection finished"
        );

        ResearchCorpus {
            queries: queries.to_vec(),
            sources,
            total_char_count,
            total_results,
            failed_queries,
            collected_at: Utc::now(),
        }
    }

    async fn collect_query(
        &self,
        query: &str,
        total_results: &mut usize,
    ) -> Result<Vec<ResearchSource>, String> {
        let limit = self.config.results_per_query;
        let results = self
            .searcher
            .search(query, limit)
            .await
            .map_err(|e| format!("search failed: {}", e))?;
        *total_results += results.len();

        if results.is_empty() {
            return Err("search returned no results".to_string());
        }

        let mut found = Vec::new();
        for result in results.into_iter().take(limit) {
            let url = result.url.to_string();
            let attempt = match self.extractor.extract_page(&url).await {
                Ok(attempt) => attempt,
                Err(e) => {
                    debug!(url = %url, error = %e, "Extraction failed");
                    continue;
                }
            };
            if attempt.char_count < self.config.min_page_chars {
                debug!(url = %url, chars = attempt.char_count, "Page below minimum size");
                continue;
            }
            found.push(ResearchSource {
                title: result.title.unwrap_or_else(|| url.clone()),
                snippet: result.snippet.unwrap_or_default(),
                url,
                char_count: attempt.char_count,
                content: attempt.text,
                relevance_score: result.relevance_score,
                query: query.to_string(),
                strategy: attempt.strategy_name,
            });
        }

        if found.is_empty() {
            return Err("no page could be extracted".to_string());
        }
        Ok(found)
    }
}

/// Keep one entry per URL (highest score; first seen on ties), sorted by
/// descending score. The sort is stable, so equal scores keep first-seen
/// order.
pub fn dedup_and_rank(pages: Vec<ResearchSource>) -> Vec<ResearchSource> {
    let mut by_url: IndexMap<String, ResearchSource> = IndexMap::new();
    for page in pages {
        match by_url.get_mut(&page.url) {
            Some(existing) if page.relevance_score > existing.relevance_score => *existing = page,
            Some(_) => {}
            None => {
                by_url.insert(page.url.clone(), page);
            }
        }
    }

    let mut sources: Vec<ResearchSource> = by_url.into_values().collect();
    sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prose, MockExtractor, MockWebSearcher};
    use crate::types::SearchResult;
    use std::time::Duration;

    fn source(url: &str, score: f64, query: &str) -> ResearchSource {
        ResearchSource {
            url: url.to_string(),
            title: url.to_string(),
            snippet: String::new(),
            content: "x".repeat(600),
            char_count: 600,
            relevance_score: score,
            query: query.to_string(),
            strategy: "mock".to_string(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default().with_inter_query_pause(Duration::ZERO)
    }

    #[test]
    fn dedup_keeps_max_score_per_url() {
        let pages = vec![
            source("https://a.test", 0.4, "q1"),
            source("https://b.test", 0.9, "q1"),
            source("https://a.test", 0.7, "q2"),
            source("https://a.test", 0.5, "q3"),
        ];

        let ranked = dedup_and_rank(pages);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://b.test");
        assert_eq!(ranked[1].url, "https://a.test");
        assert_eq!(ranked[1].relevance_score, 0.7);
        assert_eq!(ranked[1].query, "q2");
    }

    #[test]
    fn ties_keep_first_seen() {
        let ranked = dedup_and_rank(vec![
            source("https://a.test", 0.5, "first"),
            source("https://a.test", 0.5, "second"),
            source("https://c.test", 0.5, "first"),
        ]);
        assert_eq!(ranked[0].query, "first");
        assert_eq!(ranked[0].url, "https://a.test");
        assert_eq!(ranked[1].url, "https://c.test");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ranked_sources_are_unique_and_sorted(
                pages in prop::collection::vec((0usize..8, 0u32..100), 0..40)
            ) {
                let input: Vec<ResearchSource> = pages
                    .iter()
                    .map(|(site, score)| {
                        source(&format!("https://s{site}.test"), *score as f64 / 100.0, "q")
                    })
                    .collect();
                let best = |url: &str| {
                    input
                        .iter()
                        .filter(|s| s.url == url)
                        .map(|s| s.relevance_score)
                        .fold(f64::MIN, f64::max)
                };

                let ranked = dedup_and_rank(input.clone());

                let mut urls: Vec<&str> = ranked.iter().map(|s| s.url.as_str()).collect();
                urls.sort_unstable();
                urls.dedup();
                prop_assert_eq!(urls.len(), ranked.len());
                prop_assert!(ranked
                    .windows(2)
                    .all(|w| w[0].relevance_score >= w[1].relevance_score));
                for s in &ranked {
                    prop_assert_eq!(s.relevance_score, best(&s.url));
                }
            }
        }
    }

    #[tokio::test]
    async fn failed_query_does_not_stop_collection() {
        let searcher = MockWebSearcher::new()
            .with_results(
                "good",
                vec![SearchResult::from_url("https://a.test/1", 0.9).unwrap()],
            )
            .with_results(
                "dead links",
                vec![SearchResult::from_url("https://dead.test/1", 0.8).unwrap()],
            )
            .with_error("broken search");
        let extractor = MockExtractor::new().with_page("https://a.test/1", prose(800));
        let collector = ResearchCollector::new(Arc::new(searcher), Arc::new(extractor), config());

        let queries: Vec<String> = ["dead links", "broken search", "good"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let corpus = collector.collect(&queries, Progress::silent()).await;

        assert_eq!(corpus.unique_sources(), 1);
        assert_eq!(corpus.failed_queries.len(), 2);
        assert_eq!(corpus.failed_queries[0].query, "dead links");
        assert!(corpus.failed_queries[1].reason.starts_with("search failed"));
        assert_eq!(corpus.total_results, 2);
    }

    #[tokio::test]
    async fn short_pages_are_discarded() {
        let searcher = MockWebSearcher::new().with_urls("q", &["https://a.test", "https://b.test"]);
        let extractor = MockExtractor::new()
            .with_page("https://a.test/", prose(499))
            .with_page("https://b.test/", prose(500));
        let collector = ResearchCollector::new(Arc::new(searcher), Arc::new(extractor), config());

        let corpus = collector.collect(&["q".to_string()], Progress::silent()).await;

        assert_eq!(corpus.unique_sources(), 1);
        assert_eq!(corpus.sources[0].url, "https://b.test/");
        assert_eq!(corpus.total_char_count, 500);
    }

    #[tokio::test]
    async fn extraction_is_bounded_per_query() {
        let urls: Vec<String> = (0..20).map(|i| format!("https://site{i}.test/")).collect();
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let searcher = MockWebSearcher::new().with_urls("q", &url_refs);
        let extractor = Arc::new(MockExtractor::new().with_default_page(prose(600)));
        let collector = ResearchCollector::new(
            Arc::new(searcher),
            extractor.clone(),
            config().with_results_per_query(15),
        );

        let corpus = collector.collect(&["q".to_string()], Progress::silent()).await;

        assert_eq!(extractor.calls().len(), 15);
        assert_eq!(corpus.unique_sources(), 15);
    }

    #[tokio::test]
    async fn pauses_between_queries_only() {
        let searcher = MockWebSearcher::new();
        let extractor = MockExtractor::new();
        let collector = ResearchCollector::new(
            Arc::new(searcher),
            Arc::new(extractor),
            PipelineConfig::default().with_inter_query_pause(Duration::from_millis(30)),
        );
        let queries: Vec<String> = (0..3).map(|i| format!("q{i}")).collect();

        let started = std::time::Instant::now();
        collector.collect(&queries, Progress::silent()).await;

        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
