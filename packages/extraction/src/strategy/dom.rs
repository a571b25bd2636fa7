//! Generic DOM fallback.
//!
//! Drops scripts, styles and page chrome, then takes all visible text of the
//! first matching content container. Last in the cascade: low precision, but
//! it almost always produces something.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{selectors, skip_invisible, visible_text, ExtractionStrategy};
use crate::error::StrategyResult;

const CONTENT_CONTAINERS: &[&str] = &[
    "article",
    "main",
    ".content",
    "#content",
    ".post",
    ".article",
    ".entry",
    ".text",
    ".body",
    ".container",
    "div[role=\"main\"]",
];

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_CONTAINERS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
});

fn skip_chrome(el: &ElementRef<'_>) -> bool {
    skip_invisible(el) || matches!(el.value().name(), "nav" | "header" | "footer" | "aside")
}

/// Chrome-stripping whole-container extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomStrategy;

impl ExtractionStrategy for DomStrategy {
    fn name(&self) -> &'static str {
        "dom"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "dom")
    }

    fn extract(&self, html: &str, _url: &Url) -> StrategyResult<Option<String>> {
        let document = Html::parse_document(html);

        let root = CONTAINERS
            .iter()
            .find_map(|selector| document.select(selector).next())
            .or_else(|| document.select(&selectors::BODY).next())
            .unwrap_or_else(|| document.root_element());

        let text = visible_text(root, skip_chrome);
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Ok(None);
        }
        Ok(Some(lines.join("\n")))
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
    fn takes_main_container_text() {
        let text = DomStrategy.extract(&article_page(), &url()).unwrap().unwrap();

        assert!(text.starts_with("State of the fitness app market"));
        assert!(text.contains("Subscriptions are the main revenue model"));
        assert!(!text.contains("Pricing"));
        assert!(!text.contains("newsletter"));
    }

    #[test]
    fn falls_back_to_body_without_chrome() {
        let html = r#"<html><body>
            <header>Site header</header>
            <div>Loose body text that lives in plain divs.</div>
            <script>console.log("hidden")</script>
            <footer>Footer links</footer>
        </body></html>"#;
        let text = DomStrategy.extract(html, &url()).unwrap().unwrap();
        assert_eq!(text, "Loose body text that lives in plain divs.");
    }

    #[test]
    fn returns_none_for_chrome_only_page() {
        let html = "<html><body><nav>Home</nav><footer>Legal</footer></body></html>";
        assert!(DomStrategy.extract(html, &url()).unwrap().is_none());
    }
}
