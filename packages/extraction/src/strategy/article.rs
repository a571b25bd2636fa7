//! Article-body extraction.
//!
//! Looks for the conventional article body containers used by publishing
//! platforms and keeps only paragraphs that read like sentences (several
//! function words). Falls back to the whole body when no container matches.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{block_text, inside_chrome, selectors, ExtractionStrategy};
use crate::error::StrategyResult;
use crate::text::function_word_hits;

const ARTICLE_CONTAINERS: &[&str] = &[
    "[itemprop=\"articleBody\"]",
    "article",
    "[class*=\"article-body\"]",
    "[class*=\"article-content\"]",
    "[class*=\"post-content\"]",
    "[class*=\"entry-content\"]",
    "[class*=\"story-body\"]",
    ".post",
    ".article",
];

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ARTICLE_CONTAINERS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
});

/// Paragraphs need this many function words to count as prose.
const MIN_SENTENCE_FUNCTION_WORDS: usize = 3;

/// Article-body heuristic extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleStrategy;

impl ArticleStrategy {
    fn prose_paragraphs(root: ElementRef<'_>) -> Vec<String> {
        root.select(&selectors::PARAGRAPH)
            .filter(|p| !inside_chrome(p))
            .map(block_text)
            .filter(|text| function_word_hits(text) >= MIN_SENTENCE_FUNCTION_WORDS)
            .collect()
    }

    fn headline(document: &Html) -> Option<String> {
        document
            .select(&selectors::TITLE_HEADING)
            .find(|h| !inside_chrome(h))
            .map(block_text)
            .filter(|t| !t.is_empty())
    }
}

/// Drop matches nested inside another match, so each paragraph is read once
/// (`post-content` around `post-content-inner`, `article` in `article`).
fn outermost(matches: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();
    matches
        .into_iter()
        .filter(|el| !el.ancestors().any(|node| ids.contains(&node.id())))
        .collect()
}

impl ExtractionStrategy for ArticleStrategy {
    fn name(&self) -> &'static str {
        "article"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "article")
    }

    fn extract(&self, html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        let document = Html::parse_document(html);

        let from_container = CONTAINERS.iter().find_map(|selector| {
            let paragraphs: Vec<String> = outermost(document.select(selector).collect())
                .into_iter()
                .filter(|el| !inside_chrome(el))
                .flat_map(Self::prose_paragraphs)
                .collect();
            (!paragraphs.is_empty()).then_some(paragraphs)
        });

        let paragraphs = match from_container {
            Some(paragraphs) => paragraphs,
            None => match document.select(&selectors::BODY).next() {
                Some(body) => Self::prose_paragraphs(body),
                None => Vec::new(),
            },
        };

        if paragraphs.is_empty() {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(paragraphs.len() + 1);
        if let Some(headline) = Self::headline(&document) {
            parts.push(headline);
        }
        parts.extend(paragraphs);
        Ok(Some(parts.join("\n\n")))
    }
}
