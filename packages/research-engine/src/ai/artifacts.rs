//! Model-backed artifact generators.
//!
//! One generator per [`ArtifactKind`], each with its own instruction. The
//! model answers with a JSON object; visual proofs are unwrapped to the bare
//! list the pipeline's contract expects.

use std::sync::Arc;

use async_trait::async_trait;
use extraction::text::excerpt;
use serde_json::Value;
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};
use crate::pipeline::parse::parse_json_object;
use crate::pipeline::prompts::render_request;
use crate::traits::{ArtifactGenerator, GenerativeModel};
use crate::types::{AnalysisRecord, AnalysisRequest, ArtifactKind};

/// Ceiling for the serialized analysis included in each artifact prompt.
const MAX_ANALYSIS_CHARS: usize = 12_000;

const DEFAULT_MAX_TOKENS: u32 = 4_096;

fn instruction(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::CustomDrivers => {
            "Create the mental drivers that will move this customer to buy. Return \
             {\"custom_drivers\": [{\"name\", \"trigger\", \"story\", \"proof\", \"call_to_action\"}]} \
             with 5-7 drivers, each tied to a pain or desire documented in the analysis."
        }
        ArtifactKind::VisualProofs => {
            "Design demonstrations that make the offer's claims visible. Return \
             {\"visual_proofs\": [{\"title\", \"claim\", \"demonstration\", \"materials\", \"expected_impact\"}]} \
             with at least 5 proofs, each based on a fact from the analysis."
        }
        ArtifactKind::AntiObjection => {
            "Build the objection-handling system. Return {\"objections\": [{\"objection\", \
             \"root_cause\", \"response\", \"proof\"}], \"hidden_objections\": [], \"closing_sequence\": []} \
             covering every objection listed in the customer avatar."
        }
        ArtifactKind::PrePitch => {
            "Plan the pre-pitch sequence that prepares the audience before the offer. Return \
             {\"emotional_sequence\": [{\"phase\", \"goal\", \"script\", \"duration\"}], \
             \"logical_bridge\": \"\", \"transition_to_offer\": \"\"}."
        }
        ArtifactKind::FuturePredictions => {
            "Project where this market is heading over the next 3 years. Return \
             {\"trends\": [{\"trend\", \"evidence\", \"impact\", \"timeframe\"}], \
             \"opportunities\": [], \"threats\": [], \"recommended_moves\": []} using only trends \
             supported by the analysis."
        }
    }
}

/// Generates one artifact kind through a [`GenerativeModel`].
pub struct ModelArtifactGenerator {
    kind: ArtifactKind,
    model: Arc<dyn GenerativeModel>,
    max_tokens: u32,
}

impl ModelArtifactGenerator {
    pub fn new(kind: ArtifactKind, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            kind,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// One generator for every artifact kind, sharing `model`.
    pub fn full_set(model: Arc<dyn GenerativeModel>) -> Vec<Arc<dyn ArtifactGenerator>> {
        ArtifactKind::ALL
            .into_iter()
            .map(|kind| Arc::new(Self::new(kind, model.clone())) as Arc<dyn ArtifactGenerator>)
            .collect()
    }

    fn prompt(&self, record: &AnalysisRecord, request: &AnalysisRequest) -> String {
        let analysis = serde_json::to_string(record.as_map()).unwrap_or_default();
        format!(
            "# {}\n\n## PROJECT DATA\n{}\n\n## VALIDATED MARKET ANALYSIS\n{}\n\n## TASK\n{}\n\n\
             Use only facts from the analysis above. Return ONE valid JSON object and nothing else.",
            self.kind.as_str().to_uppercase(),
            render_request(request),
            excerpt(&analysis, MAX_ANALYSIS_CHARS),
            instruction(self.kind),
        )
    }
}

#[async_trait]
impl ArtifactGenerator for ModelArtifactGenerator {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    async fn generate(
        &self,
        record: &AnalysisRecord,
        request: &AnalysisRequest,
    ) -> ArtifactResult<Value> {
        let kind = self.kind;
        let prompt = self.prompt(record, request);
        debug!(artifact = %kind, prompt_chars = prompt.chars().count(), "Generating artifact");

        let response = self
            .model
            .generate(&prompt, self.max_tokens)
            .await
            .map_err(|source| ArtifactError::Generation { kind, source })?;

        let mut object =
            parse_json_object(&response).map_err(|reason| ArtifactError::Parse { kind, reason })?;

        match kind {
            ArtifactKind::VisualProofs => Ok(object
                .remove(kind.as_str())
                .unwrap_or(Value::Array(Vec::new()))),
            _ => Ok(Value::Object(object)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::analysis_record;
    use crate::testing::MockModel;
    use serde_json::json;

    #[tokio::test]
    async fn visual_proofs_unwrap_to_list() {
        let model = Arc::new(MockModel::new().with_response(
            "```json\n{\"visual_proofs\": [{\"title\": \"Before and after\"}]}\n```",
        ));
        let generator = ModelArtifactGenerator::new(ArtifactKind::VisualProofs, model.clone());

        let output = generator
            .generate(&analysis_record(20), &AnalysisRequest::new("fitness apps"))
            .await
            .unwrap();

        assert_eq!(output, json!([{"title": "Before and after"}]));
        let prompt = &model.prompts()[0];
        assert!(prompt.starts_with("# VISUAL_PROOFS"));
        assert!(prompt.contains("- **Segment**: fitness apps"));
    }

    #[tokio::test]
    async fn other_kinds_keep_the_object() {
        let model = Arc::new(MockModel::new().with_response(r#"{"custom_drivers": [{"name": "Urgency"}]}"#));
        let generator = ModelArtifactGenerator::new(ArtifactKind::CustomDrivers, model);

        let output = generator
            .generate(&analysis_record(20), &AnalysisRequest::new("fitness apps"))
            .await
            .unwrap();
        assert_eq!(output["custom_drivers"][0]["name"], "Urgency");
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let model = Arc::new(MockModel::new().with_response("not json"));
        let generator = ModelArtifactGenerator::new(ArtifactKind::PrePitch, model);

        let err = generator
            .generate(&analysis_record(20), &AnalysisRequest::new("fitness apps"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { kind: ArtifactKind::PrePitch, .. }));
    }

    #[tokio::test]
    async fn model_failure_is_generation_error() {
        let model = Arc::new(MockModel::failing());
        let generator = ModelArtifactGenerator::new(ArtifactKind::AntiObjection, model);

        let err = generator
            .generate(&analysis_record(20), &AnalysisRequest::new("fitness apps"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Generation { .. }));
    }

    #[test]
    fn full_set_covers_every_kind() {
        let generators = ModelArtifactGenerator::full_set(Arc::new(MockModel::new()));
        let kinds: Vec<_> = generators.iter().map(|g| g.kind()).collect();
        assert_eq!(kinds, ArtifactKind::ALL.to_vec());
    }
}
