//! The parsed model record and the derived artifacts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level sections every analysis record must carry, non-empty.
pub const REQUIRED_SECTIONS: [&str; 8] = [
    "customer_avatar",
    "positioning",
    "competitive_analysis",
    "keyword_strategy",
    "performance_metrics",
    "sales_funnel",
    "action_plan",
    INSIGHTS_SECTION,
];

/// Section holding the list of insights.
pub const INSIGHTS_SECTION: &str = "exclusive_insights";

/// True for null, blank strings, and empty arrays or objects.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// The structured object returned by the generative model.
///
/// Kept as a JSON map so that missing sections surface as completeness
/// failures rather than parse failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisRecord(Map<String, Value>);

impl AnalysisRecord {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a section is present and non-empty.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some_and(|v| !is_empty_value(v))
    }

    /// Insight entries; empty when the section is missing or not a list.
    pub fn insights(&self) -> &[Value] {
        self.section(INSIGHTS_SECTION)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The five derived artifacts, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    CustomDrivers,
    VisualProofs,
    AntiObjection,
    PrePitch,
    FuturePredictions,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        Self::CustomDrivers,
        Self::VisualProofs,
        Self::AntiObjection,
        Self::PrePitch,
        Self::FuturePredictions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomDrivers => "custom_drivers",
            Self::VisualProofs => "visual_proofs",
            Self::AntiObjection => "anti_objection",
            Self::PrePitch => "pre_pitch",
            Self::FuturePredictions => "future_predictions",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated outputs of the five artifact generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedArtifacts {
    pub custom_drivers: Value,
    pub visual_proofs: Vec<Value>,
    pub anti_objection: Value,
    pub pre_pitch: Value,
    pub future_predictions: Value,
}

impl DerivedArtifacts {
    pub fn get(&self, kind: ArtifactKind) -> Value {
        match kind {
            ArtifactKind::CustomDrivers => self.custom_drivers.clone(),
            ArtifactKind::VisualProofs => Value::Array(self.visual_proofs.clone()),
            ArtifactKind::AntiObjection => self.anti_objection.clone(),
            ArtifactKind::PrePitch => self.pre_pitch.clone(),
            ArtifactKind::FuturePredictions => self.future_predictions.clone(),
        }
    }

    /// Number of artifacts with non-empty output.
    pub fn present_count(&self) -> usize {
        ArtifactKind::ALL
            .iter()
            .filter(|kind| !is_empty_value(&self.get(**kind)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> AnalysisRecord {
        match value {
            Value::Object(map) => AnalysisRecord::from_map(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_values() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("  ")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(["x"])));
    }

    #[test]
    fn insights_default_to_empty() {
        assert!(record(json!({})).insights().is_empty());
        assert!(record(json!({"exclusive_insights": "text"})).insights().is_empty());
        assert_eq!(
            record(json!({"exclusive_insights": ["a", "b"]})).insights().len(),
            2
        );
    }

    #[test]
    fn record_serializes_as_plain_object() {
        let rec = record(json!({"positioning": {"niche": "home training"}}));
        assert_eq!(
            serde_json::to_string(&rec).unwrap(),
            r#"{"positioning":{"niche":"home training"}}"#
        );
        assert!(rec.has_section("positioning"));
        assert!(!rec.has_section("sales_funnel"));
    }
}
