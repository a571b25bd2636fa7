//! Page extraction seam between the collector and the extraction cascade.

use async_trait::async_trait;
use extraction::{ContentExtractor, ExtractError, ExtractionAttempt};

/// Turns a URL into validated page text.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract_page(&self, url: &str) -> Result<ExtractionAttempt, ExtractError>;
}

#[async_trait]
impl PageExtractor for ContentExtractor {
    async fn extract_page(&self, url: &str) -> Result<ExtractionAttempt, ExtractError> {
        self.extract_detailed(url).await
    }
}
