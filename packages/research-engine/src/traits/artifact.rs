//! Derived-artifact generators.
//!
//! Each generator turns a validated analysis record (and the original request)
//! into one named artifact. Minimum-output contracts are enforced by the
//! pipeline, not by the generator.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ArtifactResult;
use crate::types::{AnalysisRecord, AnalysisRequest, ArtifactKind};

#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Which artifact this generator produces.
    fn kind(&self) -> ArtifactKind;

    async fn generate(
        &self,
        record: &AnalysisRecord,
        request: &AnalysisRequest,
    ) -> ArtifactResult<Value>;
}
