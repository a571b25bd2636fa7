//! Derived-artifact orchestration.
//!
//! Runs the five generators one after another against the validated record.
//! Each output must meet its kind's minimum-output contract and pass the same
//! contamination scan as the record; the first failure aborts the report.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::progress::{PipelineStage, Progress};
use super::validate::find_banned_token;
use crate::error::{ArtifactError, ArtifactResult, PipelineResult};
use crate::traits::ArtifactGenerator;
use crate::types::{is_empty_value, AnalysisRecord, AnalysisRequest, ArtifactKind, DerivedArtifacts};

/// Field holding the driver list inside the custom-drivers artifact.
pub const DRIVERS_FIELD: &str = "custom_drivers";

/// Owns one generator per artifact kind.
pub struct DerivedArtifactOrchestrator {
    generators: HashMap<ArtifactKind, Arc<dyn ArtifactGenerator>>,
    min_visual_proofs: usize,
}

impl DerivedArtifactOrchestrator {
    /// Register generators by their declared kind. A later generator for
    /// the same kind replaces an earlier one.
    pub fn new(generators: Vec<Arc<dyn ArtifactGenerator>>, min_visual_proofs: usize) -> Self {
        let generators = generators.into_iter().map(|g| (g.kind(), g)).collect();
        Self {
            generators,
            min_visual_proofs,
        }
    }

    /// Kinds with no registered generator.
    pub fn missing_kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| !self.generators.contains_key(kind))
            .collect()
    }

    /// Generate and check all five artifacts in order.
    pub async fn generate_all(
        &self,
        record: &AnalysisRecord,
        request: &AnalysisRequest,
        progress: Progress<'_>,
    ) -> PipelineResult<DerivedArtifacts> {
        let mut outputs: HashMap<ArtifactKind, Value> = HashMap::new();

        for (i, kind) in ArtifactKind::ALL.into_iter().enumerate() {
            progress.detail(
                PipelineStage::GenerateDerivedArtifacts,
                format!("Generating {}", kind),
                format!("artifact {}/{}", i + 1, ArtifactKind::ALL.len()),
            );

            let generator = self.generators.get(&kind).ok_or_else(|| ArtifactError::Failed {
                kind,
                reason: "no generator registered".to_string(),
            })?;

            let output = generator.generate(record, request).await?;
            let output = self.check_contract(kind, output)?;
            debug!(artifact = %kind, "Artifact accepted");
            outputs.insert(kind, output);
        }

        let mut take = |kind: ArtifactKind| outputs.remove(&kind).unwrap_or(Value::Null);
        let visual_proofs = match take(ArtifactKind::VisualProofs) {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let artifacts = DerivedArtifacts {
            custom_drivers: take(ArtifactKind::CustomDrivers),
            visual_proofs,
            anti_objection: take(ArtifactKind::AntiObjection),
            pre_pitch: take(ArtifactKind::PrePitch),
            future_predictions: take(ArtifactKind::FuturePredictions),
        };

        info!(artifacts = artifacts.present_count(), "Derived artifacts generated");
        Ok(artifacts)
    }

    fn check_contract(&self, kind: ArtifactKind, output: Value) -> ArtifactResult<Value> {
        let contract = |reason: String| ArtifactError::Contract { kind, reason };

        match kind {
            ArtifactKind::CustomDrivers => {
                let drivers = output
                    .get(DRIVERS_FIELD)
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                if drivers == 0 {
                    return Err(contract(format!("no entries in {:?}", DRIVERS_FIELD)));
                }
            }
            ArtifactKind::VisualProofs => {
                let proofs = output.as_array().map_or(0, Vec::len);
                if proofs < self.min_visual_proofs {
                    return Err(contract(format!(
                        "{} visual proofs, need at least {}",
                        proofs, self.min_visual_proofs
                    )));
                }
            }
            ArtifactKind::AntiObjection | ArtifactKind::PrePitch | ArtifactKind::FuturePredictions => {
                if is_empty_value(&output) {
                    return Err(contract("empty output".to_string()));
                }
            }
        }

        if let Some(token) = find_banned_token(&output) {
            return Err(contract(format!("banned token {:?} in output", token)));
        }
        Ok(output)
    }
}
