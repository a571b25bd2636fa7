//! Web searcher trait for research discovery.
//!
//! The collector asks the searcher for candidate URLs per query; the search
//! provider's own relevance score drives deduplication and ranking.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SearchResultSet;
use crate::types::SearchResult;

/// Web search over the open web.
///
/// # Implementations
///
/// - `TavilyWebSearcher` - Tavily API
/// - `MockWebSearcher` - For testing (see [`crate::testing`])
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web, returning at most `max_results` results in the
    /// provider's order.
    async fn search(&self, query: &str, max_results: usize) -> SearchResultSet<Vec<SearchResult>>;
}

/// Bound on one search call.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Tavily-backed web searcher.
#[cfg(feature = "tavily")]
pub struct TavilyWebSearcher {
    api_key: crate::security::SecretString,
    client: reqwest::Client,
    endpoint: String,
    search_depth: String,
    timeout: Duration,
}

#[cfg(feature = "tavily")]
fn search_client(timeout: Duration) -> SearchResultSet<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| crate::error::SearchError::Http(Box::new(e)))
}

#[cfg(feature = "tavily")]
impl TavilyWebSearcher {
    /// Create a new Tavily web searcher bounded by [`DEFAULT_SEARCH_TIMEOUT`].
    pub fn new(api_key: impl Into<crate::security::SecretString>) -> SearchResultSet<Self> {
        Ok(Self {
            api_key: api_key.into(),
            client: search_client(DEFAULT_SEARCH_TIMEOUT)?,
            endpoint: "https://api.tavily.com/search".to_string(),
            search_depth: "advanced".to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        })
    }

    /// Bound every search call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> SearchResultSet<Self> {
        self.client = search_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Use a custom HTTP client. Its own timeout replaces this searcher's.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Send searches somewhere other than the public Tavily API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the search depth ("basic" or "advanced").
    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }
}

/// Score for a result the provider did not score: strictly decreasing with
/// rank, within (0, 1].
pub fn rank_score(rank: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    1.0 - rank as f64 / count as f64
}

#[cfg(feature = "tavily")]
#[async_trait]
impl WebSearcher for TavilyWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> SearchResultSet<Vec<SearchResult>> {
        use crate::error::SearchError;

        #[derive(serde::Serialize)]
        struct Request<'a> {
            query: &'a str,
            search_depth: &'a str,
            max_results: usize,
        }

        #[derive(serde::Deserialize)]
        struct Response {
            results: Vec<TavilyResult>,
        }

        #[derive(serde::Deserialize)]
        struct TavilyResult {
            url: String,
            title: Option<String>,
            content: Option<String>,
            score: Option<f64>,
        }

        let request = Request {
            query,
            search_depth: &self.search_depth,
            max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let tavily_response: Response = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        let count = tavily_response.results.len();
        let results = tavily_response
            .results
            .into_iter()
            .enumerate()
            .filter_map(|(rank, r)| {
                let score = r.score.unwrap_or_else(|| rank_score(rank, count));
                let mut result = SearchResult::from_url(&r.url, score)?;
                if let Some(title) = r.title {
                    result = result.with_title(title);
                }
                if let Some(content) = r.content {
                    result = result.with_snippet(content);
                }
                Some(result)
            })
            .take(max_results)
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWebSearcher;

    #[tokio::test]
    async fn test_mock_web_searcher() {
        let searcher = MockWebSearcher::new().with_urls(
            "fitness apps market",
            &["https://a.test/report", "https://b.test/trends"],
        );

        let results = searcher.search("fitness apps market", 15).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url.as_str(), "https://a.test/report");
        assert!(results[0].relevance_score > results[1].relevance_score);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let searcher = MockWebSearcher::new().with_urls(
            "query",
            &["https://a.test", "https://b.test", "https://c.test"],
        );

        let results = searcher.search("query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[cfg(feature = "tavily")]
    #[test]
    fn tavily_client_is_bounded_by_default() {
        let searcher = TavilyWebSearcher::new("tvly-test").unwrap();
        assert_eq!(searcher.timeout(), DEFAULT_SEARCH_TIMEOUT);

        let searcher = searcher.with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(searcher.timeout(), Duration::from_secs(5));
    }

    #[cfg(feature = "tavily")]
    #[tokio::test]
    async fn stalled_search_fails_within_its_timeout() {
        let endpoint = crate::testing::silent_endpoint().await;
        let searcher = TavilyWebSearcher::new("tvly-test")
            .unwrap()
            .with_timeout(Duration::from_millis(200))
            .unwrap()
            .with_endpoint(endpoint);

        let result = tokio::time::timeout(Duration::from_secs(5), searcher.search("gyms", 5))
            .await
            .expect("search should give up on its own");

        assert!(matches!(result, Err(crate::error::SearchError::Http(_))));
    }

    #[test]
    fn rank_score_decreases_with_rank() {
        assert_eq!(rank_score(0, 4), 1.0);
        assert!(rank_score(1, 4) > rank_score(2, 4));
        assert!(rank_score(3, 4) > 0.0);
    }
}
