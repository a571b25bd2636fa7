//! Generative model gateway.

use async_trait::async_trait;

use crate::error::GenerationResult;

/// A text-generating model. Backend selection and fallback are the
/// implementor's concern.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a completion for `prompt` within `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String>;

    /// Model/version tag recorded in report metadata.
    fn model_tag(&self) -> String;
}
