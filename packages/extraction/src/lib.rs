//! Cascading HTML Content Extraction
//!
//! Turns a URL into validated article text by trying independent extraction
//! strategies in a fixed priority order and keeping the first result that
//! passes validation.
//!
//! # Design Philosophy
//!
//! **"Real text or nothing"**
//!
//! - Each strategy is independent and may fail or panic without harm
//! - Every candidate is normalized and validated the same way
//! - Navigation and boilerplate are rejected by a function-word check
//! - Statistics are process-wide and safe to read while requests run
//!
//! # Usage
//!
//! ```rust,ignore
//! use extraction::{CascadeConfig, ContentExtractor};
//!
//! let extractor = ContentExtractor::new(CascadeConfig::default())?;
//!
//! if let Some(text) = extractor.extract("https://example.com/article").await {
//!     println!("{} chars", text.chars().count());
//! }
//!
//! let stats = extractor.stats();
//! println!("overall success: {:.1}%", stats.overall_success_rate);
//! ```
//!
//! # Modules
//!
//! - [`cascade`] - The extractor: resolve, fetch, try strategies, validate
//! - [`strategy`] - The four strategies and the capability registry
//! - [`text`] - Normalization and the content validator
//! - [`stats`] - Per-strategy statistics
//! - [`fetch`] - Page fetcher and URL resolver traits plus HTTP backends
//! - [`security`] - SSRF protection
//! - [`testing`] - Mock implementations for testing

pub mod cascade;
pub mod error;
pub mod fetch;
pub mod security;
pub mod stats;
pub mod strategy;
pub mod testing;
pub mod text;

// Re-export core types at crate root
pub use cascade::{CascadeConfig, ContentExtractor, ExtractionAttempt, ExtractionTest};
pub use error::{ExtractError, FetchError, SecurityError, StrategyError};
pub use fetch::{HttpFetcher, HttpUrlResolver, IdentityResolver, PageFetcher, UrlResolver};
pub use security::UrlValidator;
pub use stats::{ExtractorStats, StatsSnapshot, StrategyStatsSnapshot};
pub use strategy::{ExtractionStrategy, StrategyRegistry};
pub use text::{ContentValidator, Rejection, TextMetrics};
