//! Structural extraction: walk block-level elements in document order.
//!
//! Keeps headings, paragraphs, list items, quotes, code and table cells that
//! sit outside page chrome, and drops link-heavy blocks. Precision over
//! recall: short fragments without a sentence in them are discarded.

use scraper::{ElementRef, Html};
use url::Url;

use super::{block_text, inside_chrome, link_density, selectors, ExtractionStrategy};
use crate::error::StrategyResult;

/// Tags that may contain other matched blocks; nested matches are skipped so
/// text is never emitted twice.
const CONTAINER_BLOCKS: &[&str] = &["p", "li", "blockquote", "td", "th", "dd", "figcaption", "pre"];

const MIN_BLOCK_WORDS: usize = 4;
const MAX_LINK_DENSITY: f64 = 0.5;

/// Block-level structural extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStrategy;

impl StructuralStrategy {
    fn nested_in_block(el: &ElementRef<'_>) -> bool {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| CONTAINER_BLOCKS.contains(&a.value().name()))
    }

    fn keep_block(el: ElementRef<'_>, text: &str) -> bool {
        let is_heading = matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6");
        if !is_heading && text.split_whitespace().count() < MIN_BLOCK_WORDS {
            return false;
        }
        link_density(el) <= MAX_LINK_DENSITY
    }
}

impl ExtractionStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "structural")
    }

    fn extract(&self, html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        let document = Html::parse_document(html);

        let blocks: Vec<String> = document
            .select(&selectors::BLOCKS)
            .filter(|el| !inside_chrome(el) && !Self::nested_in_block(el))
            .filter_map(|el| {
                let text = block_text(el);
                Self::keep_block(el, &text).then_some(text)
            })
            .collect();

        if blocks.is_empty() {
            return Ok(None);
        }
        Ok(Some(blocks.join("\n\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::article_page;

    fn url() -> Url {
        Url::parse("https://news.test/fitness").unwrap()
    }

    #[test]
    fn extracts_article_blocks_without_chrome() {
        let text = StructuralStrategy
            .extract(&article_page(), &url())
            .unwrap()
            .unwrap();

        assert!(text.starts_with("State of the fitness app market"));
        assert!(text.contains("Subscriptions are the main revenue model"));
        assert!(!text.contains("Pricing"));
        assert!(!text.contains("newsletter"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("analytics"));
    }

    #[test]
    fn drops_link_heavy_list_items() {
        let html = r#"<body><ul>
            <li><a href="/1">One two three four five</a></li>
            <li>Plain list item with enough words to keep</li>
        </ul></body>"#;
        let text = StructuralStrategy.extract(html, &url()).unwrap().unwrap();
        assert_eq!(text, "Plain list item with enough words to keep");
    }

    #[test]
    fn returns_none_for_empty_document() {
        let out = StructuralStrategy
            .extract("<html><body><nav>Menu</nav></body></html>", &url())
            .unwrap();
        assert!(out.is_none());
    }
}
