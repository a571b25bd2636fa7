//! Extraction strategies and the capability registry.
//!
//! A strategy turns raw HTML into candidate plain text. Strategies are
//! independent of each other; the cascade tries them in priority order:
//!
//! 1. [`StructuralStrategy`] - block-level walk with boilerplate filtering
//! 2. [`ReadabilityStrategy`] - paragraph scoring to find the main container
//! 3. [`ArticleStrategy`] - article-body selectors plus sentence filtering
//! 4. [`DomStrategy`] - strip chrome, take the first content container or body
//!
//! Each built-in strategy is gated by a cargo feature of the same name.

mod article;
mod dom;
mod readability;
mod structural;

use std::sync::Arc;

use scraper::ElementRef;
use tracing::info;
use url::Url;

use crate::error::StrategyResult;

pub use article::ArticleStrategy;
pub use dom::DomStrategy;
pub use readability::ReadabilityStrategy;
pub use structural::StructuralStrategy;

/// One independent HTML-to-text algorithm.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable name used in logs and statistics.
    fn name(&self) -> &'static str;

    /// Whether the strategy's runtime capability is present.
    fn is_available(&self) -> bool {
        true
    }

    /// Extract candidate text. `Ok(None)` means the strategy found nothing.
    fn extract(&self, html: &str, url: &Url) -> StrategyResult<Option<String>>;
}

/// Strategies in priority order, filtered once by availability.
#[derive(Clone)]
pub struct StrategyRegistry {
    known: Vec<(&'static str, bool)>,
    active: Vec<Arc<dyn ExtractionStrategy>>,
}

impl StrategyRegistry {
    /// The four built-in strategies in their fixed priority order.
    pub fn builtin() -> Self {
        Self::from_strategies(vec![
            Arc::new(StructuralStrategy) as Arc<dyn ExtractionStrategy>,
            Arc::new(ReadabilityStrategy),
            Arc::new(ArticleStrategy),
            Arc::new(DomStrategy),
        ])
    }

    /// Build a registry from strategies listed in priority order.
    pub fn from_strategies(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        let known: Vec<_> = strategies
            .iter()
            .map(|s| (s.name(), s.is_available()))
            .collect();
        let active: Vec<_> = strategies.into_iter().filter(|s| s.is_available()).collect();

        info!(
            available = ?active.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "Extraction strategies registered"
        );

        Self { known, active }
    }

    /// Available strategies in priority order.
    pub fn active(&self) -> &[Arc<dyn ExtractionStrategy>] {
        &self.active
    }

    /// Every registered strategy name with its availability.
    pub fn known(&self) -> &[(&'static str, bool)] {
        &self.known
    }

    /// Names of the available strategies.
    pub fn available_names(&self) -> Vec<&'static str> {
        self.active.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("known", &self.known)
            .finish()
    }
}

// ============================================================================
// Shared DOM helpers
// ============================================================================

/// Elements whose text is never content.
const INVISIBLE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head", "title",
];

/// Page chrome.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form", "menu", "dialog"];

/// Class/id fragments that mark chrome containers.
const CHROME_HINTS: &[&str] = &[
    "nav", "navbar", "menu", "footer", "header", "sidebar", "cookie", "banner", "advert", "share",
    "social", "comment", "related", "breadcrumb", "popup", "modal", "newsletter", "subscribe",
];

/// Block-level tags that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "pre", "table", "tr", "td", "th", "br", "dd", "dt", "figcaption",
];

fn class_and_id(el: &ElementRef<'_>) -> String {
    let value = el.value();
    let mut out = value.attr("class").unwrap_or_default().to_lowercase();
    out.push(' ');
    out.push_str(&value.attr("id").unwrap_or_default().to_lowercase());
    out
}

/// True for navigation, headers, footers, sidebars and similar chrome.
pub(crate) fn is_chrome(el: &ElementRef<'_>) -> bool {
    let name = el.value().name();
    if INVISIBLE_TAGS.contains(&name) || CHROME_TAGS.contains(&name) {
        return true;
    }
    if matches!(name, "html" | "body" | "main" | "article") {
        return false;
    }
    let attrs = class_and_id(el);
    attrs
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .any(|token| CHROME_HINTS.contains(&token))
}

/// True when the element or any ancestor is chrome.
pub(crate) fn inside_chrome(el: &ElementRef<'_>) -> bool {
    is_chrome(el) || el.ancestors().filter_map(ElementRef::wrap).any(|a| is_chrome(&a))
}

/// Visible text below `root`, with a newline at each block boundary.
///
/// `skip` decides which descendant elements are dropped with their subtree.
pub(crate) fn visible_text(root: ElementRef<'_>, skip: fn(&ElementRef<'_>) -> bool) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            if BLOCK_TAGS.contains(&el.value().name()) {
                out.push('\n');
            }
            continue;
        }
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|el| skip(&el));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Skip only elements that never render text.
pub(crate) fn skip_invisible(el: &ElementRef<'_>) -> bool {
    INVISIBLE_TAGS.contains(&el.value().name())
}

/// Text of one block collapsed to single spaces.
pub(crate) fn block_text(el: ElementRef<'_>) -> String {
    visible_text(el, skip_invisible)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Share of an element's text that sits inside links.
pub(crate) fn link_density(el: ElementRef<'_>) -> f64 {
    let total = block_text(el).chars().count();
    if total == 0 {
        return 1.0;
    }
    let linked: usize = el
        .select(&selectors::LINK)
        .map(|a| block_text(a).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// Pre-parsed selectors shared by the strategies.
pub(crate) mod selectors {
    use std::sync::LazyLock;

    use scraper::Selector;

    fn parse(css: &str) -> Selector {
        Selector::parse(css).expect("static selector is valid")
    }

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| parse("a"));
    pub static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| parse("p"));
    pub static BODY: LazyLock<Selector> = LazyLock::new(|| parse("body"));
    pub static TITLE_HEADING: LazyLock<Selector> = LazyLock::new(|| parse("h1"));
    pub static BLOCKS: LazyLock<Selector> = LazyLock::new(|| {
        parse("h1, h2, h3, h4, h5, h6, p, li, blockquote, pre, td, th, dd, figcaption")
    });
    pub static CONTENT_BLOCKS: LazyLock<Selector> =
        LazyLock::new(|| parse("h2, h3, h4, p, li, blockquote, pre"));
}
