//! Testing utilities including mock implementations.
//!
//! These are useful for testing code that uses the research engine without
//! making real search, fetch or model calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use extraction::{ExtractError, ExtractionAttempt};
use serde_json::Value;
use url::Url;

use crate::error::{
    ArtifactError, ArtifactResult, GenerationError, GenerationResult, SearchError, SearchResultSet,
};
use crate::traits::searcher::rank_score;
use crate::traits::{ArtifactGenerator, GenerativeModel, PageExtractor, WebSearcher};
use crate::types::{
    AnalysisRecord, AnalysisRequest, ArtifactKind, ResearchCorpus, ResearchSource, SearchResult,
};

fn normalize_key(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

// =============================================================================
// Search
// =============================================================================

/// A mock web searcher with canned results per query.
///
/// Queries without canned results return the default results (empty unless
/// set).
#[derive(Default)]
pub struct MockWebSearcher {
    results: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    default_results: Arc<RwLock<Vec<SearchResult>>>,
    errors: Arc<RwLock<Vec<String>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `results` for `query`.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    /// Return `urls` for `query`, scored by rank.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results = urls
            .iter()
            .enumerate()
            .filter_map(|(rank, url)| {
                SearchResult::from_url(url, rank_score(rank, urls.len()))
                    .map(|r| r.with_title(format!("Source {}", rank + 1)))
            })
            .collect();
        self.with_results(query, results)
    }

    /// Return `results` for every query without canned results.
    pub fn with_default_results(self, results: Vec<SearchResult>) -> Self {
        *self.default_results.write().unwrap() = results;
        self
    }

    /// Fail `query` with a provider error.
    pub fn with_error(self, query: &str) -> Self {
        self.errors.write().unwrap().push(query.to_string());
        self
    }

    /// Queries searched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> SearchResultSet<Vec<SearchResult>> {
        self.calls.write().unwrap().push(query.to_string());

        if self.errors.read().unwrap().iter().any(|q| q == query) {
            return Err(SearchError::Api {
                status: 500,
                body: "mock failure".to_string(),
            });
        }

        let results = self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default_results.read().unwrap().clone());
        Ok(results.into_iter().take(max_results).collect())
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// A mock page extractor serving predefined text by URL.
///
/// Unknown URLs fail as if every strategy was exhausted.
#[derive(Default)]
pub struct MockExtractor {
    pages: Arc<RwLock<HashMap<String, String>>>,
    default_page: Arc<RwLock<Option<String>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `url`.
    pub fn with_page(self, url: &str, text: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(normalize_key(url), text.into());
        self
    }

    /// Serve `text` for every URL without a page of its own.
    pub fn with_default_page(self, text: impl Into<String>) -> Self {
        *self.default_page.write().unwrap() = Some(text.into());
        self
    }

    /// URLs extracted so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageExtractor for MockExtractor {
    async fn extract_page(&self, url: &str) -> Result<ExtractionAttempt, ExtractError> {
        let key = normalize_key(url);
        self.calls.write().unwrap().push(key.clone());

        let text = self
            .pages
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .or_else(|| self.default_page.read().unwrap().clone());

        match text {
            Some(text) => Ok(ExtractionAttempt {
                strategy_name: "mock".to_string(),
                url: key,
                char_count: text.chars().count(),
                word_count: text.split_whitespace().count(),
                text,
                elapsed: Duration::ZERO,
            }),
            None => Err(ExtractError::Exhausted { url: key, tried: 0 }),
        }
    }
}

// =============================================================================
// Generation
// =============================================================================

/// A mock generative model.
///
/// Serves queued responses in order; the last one repeats. With no responses
/// queued every call fails with an empty response.
#[derive(Default)]
pub struct MockModel {
    responses: Arc<RwLock<VecDeque<String>>>,
    failing: bool,

    /// Call tracking for assertions
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model whose every call fails with an API error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Queue a response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(response.into());
        self
    }

    /// Number of `generate` calls.
    pub fn calls(&self) -> usize {
        self.prompts.read().unwrap().len()
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> GenerationResult<String> {
        self.prompts.write().unwrap().push(prompt.to_string());

        if self.failing {
            return Err(GenerationError::Api {
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        let mut responses = self.responses.write().unwrap();
        if responses.len() > 1 {
            return responses.pop_front().ok_or(GenerationError::EmptyResponse);
        }
        responses.front().cloned().ok_or(GenerationError::EmptyResponse)
    }

    fn model_tag(&self) -> String {
        "mock/analysis-1".to_string()
    }
}

/// A mock artifact generator returning a fixed output.
pub struct MockArtifactGenerator {
    kind: ArtifactKind,
    output: Option<Value>,
    calls: AtomicUsize,
}

impl MockArtifactGenerator {
    pub fn new(kind: ArtifactKind, output: Value) -> Self {
        Self {
            kind,
            output: Some(output),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator whose every call fails.
    pub fn failing(kind: ArtifactKind) -> Self {
        Self {
            kind,
            output: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `generate` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactGenerator for MockArtifactGenerator {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    async fn generate(
        &self,
        _record: &AnalysisRecord,
        _request: &AnalysisRequest,
    ) -> ArtifactResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().ok_or(ArtifactError::Generation {
            kind: self.kind,
            source: GenerationError::EmptyResponse,
        })
    }
}

// =============================================================================
// Text and corpus builders
// =============================================================================

const PROSE: &str = "Fitness app subscriptions grew for the third year in a row as more people \
trained at home. Most paying users open their app at least four times a week and they expect \
coaching that adapts to their progress. Retention is the main challenge for small studios, \
because the first month decides whether a member stays for a full year. Partnerships with gyms \
and employers lowered the cost of acquiring new members in several regional markets. ";

/// Exactly `chars` characters of clean English prose.
pub fn prose(chars: usize) -> String {
    PROSE.chars().cycle().take(chars).collect()
}

/// A ranked corpus of `sources` pages of `chars_each` characters.
pub fn corpus_with(sources: usize, chars_each: usize) -> ResearchCorpus {
    let sources: Vec<ResearchSource> = (0..sources)
        .map(|i| ResearchSource {
            url: format!("https://source{}.test/report", i),
            title: format!("Market report {}", i + 1),
            snippet: String::new(),
            content: prose(chars_each),
            char_count: chars_each,
            relevance_score: 1.0 - i as f64 * 0.01,
            query: "fitness apps market size statistics 2024 growth".to_string(),
            strategy: "mock".to_string(),
        })
        .collect();

    ResearchCorpus {
        queries: vec!["fitness apps market size statistics 2024 growth".to_string()],
        total_char_count: sources.iter().map(|s| s.char_count).sum(),
        total_results: sources.len(),
        sources,
        failed_queries: Vec::new(),
        collected_at: Utc::now(),
    }
}

/// Well-formed analysis records and artifacts.
/// Local HTTP endpoint that accepts connections and never answers.
///
/// Returns its base URL, e.g. `http://127.0.0.1:41234`.
pub async fn silent_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

pub mod fixtures {
    use super::*;
    use crate::types::DerivedArtifacts;
    use serde_json::json;

    /// Analysis JSON with every required section and `insights` insights.
    pub fn analysis_json(insights: usize) -> Value {
        let insights: Vec<String> = (1..=insights)
            .map(|i| format!("Finding {}: members who log four sessions a week renew at twice the rate", i))
            .collect();

        json!({
            "customer_avatar": {
                "persona_name": "Busy Professional Ana",
                "demographic_profile": {"age": "28-40", "income": "middle to upper middle"},
                "pain_points": ["No time to reach a gym", "Lost motivation after a few weeks"],
                "desires": ["Visible progress in 90 days", "Training that fits a lunch break"],
                "objections": ["Subscriptions pile up", "Doubts about results at home"]
            },
            "positioning": {
                "value_proposition": "Coached home training that adapts every week",
                "niche": "Time-poor professionals",
                "differentiators": ["Weekly plan adjustment", "Human coach check-ins"]
            },
            "competitive_analysis": [
                {"name": "Large studio chain", "weaknesses": ["Little personal follow-up"]}
            ],
            "keyword_strategy": {
                "primary_keywords": ["home workout plan", "online fitness coach"]
            },
            "performance_metrics": {
                "kpis": [{"metric": "Monthly retention", "target": "85%"}],
                "expected_roi": "3x within the first year"
            },
            "sales_funnel": {
                "top_of_funnel": {"goal": "Reach", "strategies": ["Short training videos"]}
            },
            "action_plan": {
                "days_1_30": {"focus": "Launch", "activities": ["Open the beta to 200 members"]}
            },
            "exclusive_insights": insights,
        })
    }

    /// [`analysis_json`] as a record.
    pub fn analysis_record(insights: usize) -> AnalysisRecord {
        match analysis_json(insights) {
            Value::Object(map) => AnalysisRecord::from_map(map),
            _ => AnalysisRecord::default(),
        }
    }

    /// An output meeting `kind`'s contract.
    pub fn artifact_output(kind: ArtifactKind) -> Value {
        match kind {
            ArtifactKind::CustomDrivers => json!({
                "custom_drivers": [
                    {"name": "Lunch break win", "trigger": "Lack of time"},
                    {"name": "Ninety day proof", "trigger": "Doubt about results"}
                ]
            }),
            ArtifactKind::VisualProofs => json!([
                {"title": "Progress photos", "claim": "Visible change in 90 days"},
                {"title": "Session timer", "claim": "Workouts fit in 30 minutes"},
                {"title": "Retention chart", "claim": "Members stay longer"},
                {"title": "Coach chat log", "claim": "Weekly human feedback"},
                {"title": "Cost comparison", "claim": "Cheaper than a studio pass"}
            ]),
            ArtifactKind::AntiObjection => json!({
                "objections": [{"objection": "Too expensive", "response": "Costs less than one studio class a week"}]
            }),
            ArtifactKind::PrePitch => json!({
                "emotional_sequence": [{"phase": "Recognition", "goal": "Name the lost-motivation pattern"}]
            }),
            ArtifactKind::FuturePredictions => json!({
                "trends": [{"trend": "Hybrid memberships", "timeframe": "2025-2026"}]
            }),
        }
    }

    /// All five artifacts, each meeting its contract.
    pub fn artifacts() -> DerivedArtifacts {
        let visual_proofs = match artifact_output(ArtifactKind::VisualProofs) {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        DerivedArtifacts {
            custom_drivers: artifact_output(ArtifactKind::CustomDrivers),
            visual_proofs,
            anti_objection: artifact_output(ArtifactKind::AntiObjection),
            pre_pitch: artifact_output(ArtifactKind::PrePitch),
            future_predictions: artifact_output(ArtifactKind::FuturePredictions),
        }
    }

    /// One mock generator per kind, each returning [`artifact_output`].
    pub fn artifact_generators() -> Vec<Arc<dyn ArtifactGenerator>> {
        ArtifactKind::ALL
            .into_iter()
            .map(|kind| {
                Arc::new(MockArtifactGenerator::new(kind, artifact_output(kind)))
                    as Arc<dyn ArtifactGenerator>
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::validate::find_banned_token;

    #[test]
    fn prose_has_exact_length() {
        assert_eq!(prose(0), "");
        assert_eq!(prose(499).chars().count(), 499);
        assert_eq!(prose(3_100).chars().count(), 3_100);
    }

    #[test]
    fn fixtures_are_clean() {
        assert_eq!(find_banned_token(&Value::String(prose(5_000))), None);
        assert_eq!(find_banned_token(&fixtures::analysis_json(30)), None);
        for kind in ArtifactKind::ALL {
            assert_eq!(find_banned_token(&fixtures::artifact_output(kind)), None, "{kind}");
        }
    }

    #[test]
    fn corpus_is_ranked() {
        let corpus = corpus_with(3, 1_000);
        assert_eq!(corpus.total_char_count, 3_000);
        assert!(corpus.sources[0].relevance_score > corpus.sources[2].relevance_score);
    }

    #[tokio::test]
    async fn model_repeats_last_response() {
        let model = MockModel::new().with_response("a").with_response("b");
        assert_eq!(model.generate("p", 1).await.unwrap(), "a");
        assert_eq!(model.generate("p", 1).await.unwrap(), "b");
        assert_eq!(model.generate("p", 1).await.unwrap(), "b");
        assert_eq!(model.calls(), 3);
    }
}
