//! Readability-style extraction.
//!
//! Scores each paragraph by length and comma count, propagates the score to
//! its parent (full) and grandparent (half), adjusts containers by class/id
//! hints and link density, and returns the text of the best container.

use std::collections::HashMap;

use scraper::{ElementRef, Html};
use url::Url;

use super::{block_text, inside_chrome, link_density, selectors, ExtractionStrategy};
use crate::error::{StrategyError, StrategyResult};

const MIN_PARAGRAPH_CHARS: usize = 25;

const POSITIVE_HINTS: &[&str] = &[
    "article", "body", "content", "entry", "main", "page", "post", "text", "blog", "story",
];
const NEGATIVE_HINTS: &[&str] = &[
    "comment", "meta", "footer", "footnote", "masthead", "promo", "related", "scroll", "shoutbox",
    "sidebar", "sponsor", "shopping", "tags", "tool", "widget", "nav", "menu",
];

/// Paragraph-density readability heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityStrategy;

impl ReadabilityStrategy {
    fn paragraph_score(text: &str) -> f64 {
        let commas = text.matches(',').count() as f64;
        let length_bonus = (text.chars().count() as f64 / 100.0).min(3.0);
        1.0 + commas + length_bonus
    }

    fn class_weight(el: &ElementRef<'_>) -> f64 {
        let value = el.value();
        let attrs = format!(
            "{} {}",
            value.attr("class").unwrap_or_default(),
            value.attr("id").unwrap_or_default()
        )
        .to_lowercase();

        let mut weight = 0.0;
        if POSITIVE_HINTS.iter().any(|h| attrs.contains(h)) {
            weight += 25.0;
        }
        if NEGATIVE_HINTS.iter().any(|h| attrs.contains(h)) {
            weight -= 25.0;
        }
        match value.name() {
            "article" | "main" => weight + 10.0,
            "div" | "section" => weight + 5.0,
            _ => weight,
        }
    }
}

impl ExtractionStrategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "readability")
    }

    fn extract(&self, html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        let document = Html::parse_document(html);
        let mut scores = HashMap::new();

        for paragraph in document.select(&selectors::PARAGRAPH) {
            if inside_chrome(&paragraph) {
                continue;
            }
            let text = block_text(paragraph);
            if text.chars().count() < MIN_PARAGRAPH_CHARS {
                continue;
            }
            let score = Self::paragraph_score(&text);

            let mut ancestors = paragraph.ancestors().filter_map(ElementRef::wrap);
            if let Some(parent) = ancestors.next() {
                *scores.entry(parent.id()).or_insert(0.0) += score;
            }
            if let Some(grandparent) = ancestors.next() {
                *scores.entry(grandparent.id()).or_insert(0.0) += score / 2.0;
            }
        }

        let best = scores
            .into_iter()
            .filter_map(|(id, base)| {
                let el = ElementRef::wrap(document.tree.get(id)?)?;
                let score = (base + Self::class_weight(&el)) * (1.0 - link_density(el));
                Some((el, score))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let Some((container, score)) = best else {
            return Ok(None);
        };
        if score <= 0.0 {
            return Err(StrategyError::failed(
                self.name(),
                format!("best container scored {:.1}", score),
            ));
        }

        let blocks: Vec<String> = container
            .select(&selectors::CONTENT_BLOCKS)
            .filter(|el| !inside_chrome(el))
            .map(block_text)
            .filter(|t| !t.is_empty())
            .collect();

        Ok((!blocks.is_empty()).then(|| blocks.join("\n\n")))
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
    fn picks_the_article_container() {
        let text = ReadabilityStrategy
            .extract(&article_page(), &url())
            .unwrap()
            .unwrap();

        assert!(text.contains("The fitness app market grew again this year"));
        assert!(!text.contains("newsletter"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn prefers_dense_container_over_link_list() {
        let html = r#"<body>
            <div class="links"><p><a href="/x">A linked paragraph, which is, mostly, links, only</a></p></div>
            <div class="post"><p>Real prose, with commas, clauses, and detail about the market and its growth.</p>
            <p>Another paragraph, also long enough, describing how subscriptions work for users.</p></div>
        </body>"#;
        let text = ReadabilityStrategy.extract(html, &url()).unwrap().unwrap();
        assert!(text.starts_with("Real prose"));
        assert!(!text.contains("linked paragraph"));
    }

    #[test]
    fn returns_none_without_paragraphs() {
        let out = ReadabilityStrategy
            .extract("<html><body><div>just a div</div></body></html>", &url())
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn score_grows_with_commas_and_length() {
        let short = ReadabilityStrategy::paragraph_score("plain text");
        let rich = ReadabilityStrategy::paragraph_score(&"a, b, c ".repeat(40));
        assert!(rich > short);
        assert_eq!(short, 1.0 + 10.0 / 100.0);
    }
}
