//! The extraction cascade.
//!
//! `resolve -> fetch -> [strategy -> normalize -> validate]*`, stopping at the
//! first strategy whose output is accepted. A failing or panicking strategy
//! only costs that strategy a failure in the statistics.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ExtractError, ExtractResult, FetchError, StrategyError, StrategyResult};
use crate::fetch::{HttpFetcher, HttpUrlResolver, PageFetcher, UrlResolver, DEFAULT_USER_AGENT};
use crate::stats::{ExtractorStats, StatsSnapshot};
use crate::strategy::{ExtractionStrategy, StrategyRegistry};
use crate::text::{self, ContentValidator};

/// Configuration for the extraction cascade.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Upper bound for one page fetch. Default: 30 s.
    pub fetch_timeout: Duration,

    /// Raw HTML shorter than this is rejected before any strategy runs.
    /// Default: 1000 characters.
    pub min_html_chars: usize,

    /// Accepted text must have at least this many characters. Default: 500.
    pub min_content_chars: usize,

    /// Accepted text must have at least this many words. Default: 50.
    pub min_words: usize,

    /// Minimum share of function words. Default: 0.10.
    pub min_function_word_ratio: f64,

    /// Normalized text is cut to this many characters. Default: 50 000.
    pub max_content_chars: usize,

    pub user_agent: String,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            min_html_chars: 1000,
            min_content_chars: 500,
            min_words: 50,
            min_function_word_ratio: 0.10,
            max_content_chars: 50_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CascadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the minimum raw HTML size.
    pub fn with_min_html_chars(mut self, chars: usize) -> Self {
        self.min_html_chars = chars;
        self
    }

    /// Set the User-Agent for the HTTP session.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn content_validator(&self) -> ContentValidator {
        ContentValidator {
            min_chars: self.min_content_chars,
            min_words: self.min_words,
            min_function_word_ratio: self.min_function_word_ratio,
        }
    }
}

/// The accepted output of one cascade run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionAttempt {
    pub strategy_name: String,
    /// URL after resolution.
    pub url: String,
    pub text: String,
    pub char_count: usize,
    pub word_count: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Single-URL diagnostic result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionTest {
    pub url: String,
    pub success: bool,
    pub strategy: Option<String>,
    pub char_count: usize,
    pub word_count: usize,
    pub elapsed_ms: u64,
    /// First characters of the accepted text.
    pub preview: Option<String>,
    pub error: Option<String>,
    pub available_extractors: Vec<String>,
}

const PREVIEW_CHARS: usize = 500;

/// Cascading content extractor with process-wide statistics.
///
/// Share one instance (behind an `Arc`) across requests; statistics and the
/// HTTP session are internally synchronized.
pub struct ContentExtractor {
    config: CascadeConfig,
    validator: ContentValidator,
    fetcher: Arc<dyn PageFetcher>,
    resolver: Arc<dyn UrlResolver>,
    registry: StrategyRegistry,
    stats: ExtractorStats,
}

impl ContentExtractor {
    /// Extractor over the real HTTP session and the built-in strategies.
    pub fn new(config: CascadeConfig) -> ExtractResult<Self> {
        let fetcher = HttpFetcher::with_user_agent(config.user_agent.clone(), config.fetch_timeout)?;
        let resolver = HttpUrlResolver::new(config.fetch_timeout)?;
        Ok(Self::with_parts(
            config,
            Arc::new(fetcher),
            Arc::new(resolver),
            StrategyRegistry::builtin(),
        ))
    }

    /// Extractor over explicit collaborators.
    pub fn with_parts(
        config: CascadeConfig,
        fetcher: Arc<dyn PageFetcher>,
        resolver: Arc<dyn UrlResolver>,
        registry: StrategyRegistry,
    ) -> Self {
        let stats = ExtractorStats::new(registry.known());
        Self {
            validator: config.content_validator(),
            config,
            fetcher,
            resolver,
            registry,
            stats,
        }
    }

    /// Extract validated text from a URL, or `None` when nothing passed.
    pub async fn extract(&self, url: &str) -> Option<String> {
        self.extract_detailed(url).await.ok().map(|attempt| attempt.text)
    }

    /// Run the cascade and report which strategy won.
    pub async fn extract_detailed(&self, url: &str) -> ExtractResult<ExtractionAttempt> {
        let started = Instant::now();
        let result = self.run_cascade(url, started).await;
        self.stats.record_call(result.is_ok());
        result
    }

    async fn run_cascade(&self, url: &str, started: Instant) -> ExtractResult<ExtractionAttempt> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        let resolved = self.resolver.resolve(&parsed).await;

        let html = self
            .fetcher
            .fetch(&resolved, self.config.fetch_timeout)
            .await?;
        let html_chars = html.chars().count();
        if html_chars < self.config.min_html_chars {
            warn!(url = %resolved, chars = html_chars, "HTML payload too small");
            return Err(FetchError::TooSmall {
                url: resolved.to_string(),
                chars: html_chars,
                min: self.config.min_html_chars,
            }
            .into());
        }

        let strategies = self.registry.active();
        for strategy in strategies {
            let name = strategy.name();
            let candidate = match run_guarded(strategy.as_ref(), &html, &resolved) {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    debug!(url = %resolved, strategy = name, "Strategy found no content");
                    self.stats.record_failure(name);
                    continue;
                }
                Err(e) => {
                    warn!(url = %resolved, strategy = name, error = %e, "Strategy failed");
                    self.stats.record_failure(name);
                    continue;
                }
            };

            let text = text::normalize(&candidate, self.config.max_content_chars);
            match self.validator.validate(&text) {
                Ok(metrics) => {
                    let elapsed = started.elapsed();
                    self.stats.record_success(name, elapsed);
                    info!(
                        url = %resolved,
                        strategy = name,
                        chars = metrics.char_count,
                        words = metrics.word_count,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Content extracted"
                    );
                    return Ok(ExtractionAttempt {
                        strategy_name: name.to_string(),
                        url: resolved.to_string(),
                        text,
                        char_count: metrics.char_count,
                        word_count: metrics.word_count,
                        elapsed,
                    });
                }
                Err(rejection) => {
                    debug!(url = %resolved, strategy = name, reason = %rejection, "Candidate rejected");
                    self.stats.record_failure(name);
                }
            }
        }

        warn!(url = %resolved, tried = strategies.len(), "All extraction strategies failed");
        Err(ExtractError::Exhausted {
            url: resolved.to_string(),
            tried: strategies.len(),
        })
    }

    /// Diagnostic run for one URL; never fails.
    pub async fn test_extraction(&self, url: &str) -> ExtractionTest {
        let started = Instant::now();
        let result = self.extract_detailed(url).await;
        let available_extractors = self
            .registry
            .available_names()
            .into_iter()
            .map(String::from)
            .collect();

        match result {
            Ok(attempt) => ExtractionTest {
                url: attempt.url,
                success: true,
                strategy: Some(attempt.strategy_name),
                char_count: attempt.char_count,
                word_count: attempt.word_count,
                elapsed_ms: attempt.elapsed.as_millis() as u64,
                preview: Some(text::excerpt(&attempt.text, PREVIEW_CHARS).to_string()),
                error: None,
                available_extractors,
            },
            Err(e) => ExtractionTest {
                url: url.to_string(),
                success: false,
                strategy: None,
                char_count: 0,
                word_count: 0,
                elapsed_ms: started.elapsed().as_millis() as u64,
                preview: None,
                error: Some(e.to_string()),
                available_extractors,
            },
        }
    }

    /// Current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Reset all statistics, or one strategy's. `false` for unknown names.
    pub fn reset_extractor_stats(&self, strategy: Option<&str>) -> bool {
        self.stats.reset(strategy)
    }

    /// Drop the shared HTTP session (connections and cookies).
    pub fn clear_session(&self) {
        self.fetcher.clear_session();
    }

    /// Names of the strategies this build can run.
    pub fn available_extractors(&self) -> Vec<&'static str> {
        self.registry.available_names()
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

fn run_guarded(
    strategy: &dyn ExtractionStrategy,
    html: &str,
    url: &Url,
) -> StrategyResult<Option<String>> {
    catch_unwind(AssertUnwindSafe(|| strategy.extract(html, url))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(StrategyError::Panicked {
            strategy: strategy.name(),
            message,
        })
    })
}
