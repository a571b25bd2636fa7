//! Testing utilities including mock implementations.
//!
//! These are useful for testing code that uses the extraction library
//! without making real network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use url::Url;

use crate::error::{FetchError, FetchResult, StrategyError, StrategyResult};
use crate::fetch::PageFetcher;
use crate::strategy::ExtractionStrategy;

/// A mock fetcher serving predefined HTML by URL.
///
/// Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    /// Predefined pages by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// URLs that fail with a timeout
    timeouts: Arc<RwLock<Vec<String>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,

    session_clears: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl AsRef<str>, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(normalize_key(url.as_ref()), html.into());
        self
    }

    /// Make `url` time out.
    pub fn with_timeout(self, url: impl AsRef<str>) -> Self {
        self.timeouts
            .write()
            .unwrap()
            .push(normalize_key(url.as_ref()));
        self
    }

    /// Get all URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of `clear_session` calls.
    pub fn session_clears(&self) -> usize {
        self.session_clears.load(Ordering::SeqCst)
    }
}

fn normalize_key(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> FetchResult<String> {
        let key = url.to_string();
        self.calls.write().unwrap().push(key.clone());

        if self.timeouts.read().unwrap().contains(&key) {
            return Err(FetchError::Timeout { url: key });
        }
        self.pages
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(FetchError::Status {
                url: key,
                status: 404,
            })
    }

    fn clear_session(&self) {
        self.session_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// A strategy that always returns the same output and counts its calls.
pub struct StaticStrategy {
    name: &'static str,
    output: Option<String>,
    calls: AtomicUsize,
}

impl StaticStrategy {
    pub fn new(name: &'static str, output: Option<&str>) -> Self {
        Self {
            name,
            output: output.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `extract` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExtractionStrategy for StaticStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// A strategy that always returns an error.
pub struct FailingStrategy {
    name: &'static str,
}

impl FailingStrategy {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ExtractionStrategy for FailingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        Err(StrategyError::failed(self.name, "mock failure"))
    }
}

/// A strategy that panics inside `extract`.
pub struct PanickingStrategy {
    name: &'static str,
}

impl PanickingStrategy {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ExtractionStrategy for PanickingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        panic!("{} exploded on malformed markup", self.name)
    }
}

/// A strategy whose capability is missing in this build.
pub struct UnavailableStrategy {
    name: &'static str,
}

impl UnavailableStrategy {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ExtractionStrategy for UnavailableStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn extract(&self, _html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        Err(StrategyError::failed(self.name, "capability missing"))
    }
}
