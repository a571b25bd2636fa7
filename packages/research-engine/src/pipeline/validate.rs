//! Anti-simulation and completeness gates on the parsed record.
//!
//! Both are all-or-nothing: one banned token anywhere, one missing section,
//! or one insight short fails the whole record.

use serde_json::Value;

use super::gate::ensure;
use crate::error::{FailureKind, PipelineResult};
use crate::types::{AnalysisRecord, REQUIRED_SECTIONS};

/// Placeholder markers that mean the model filled gaps instead of citing
/// research. Matched case-insensitively against the serialized record.
pub const BANNED_TOKENS: [&str; 11] = [
    "not informed",
    "n/a",
    "example",
    "simulated",
    "fictitious",
    "hypothetical",
    "generic",
    "placeholder",
    "template",
    "insufficient data",
    "not available",
];

/// First banned token found anywhere in `value`, keys included.
pub fn find_banned_token(value: &Value) -> Option<&'static str> {
    let serialized = value.to_string().to_lowercase();
    BANNED_TOKENS
        .into_iter()
        .find(|token| serialized.contains(token))
}

/// Fail with `ContaminationFailure` if the record holds any banned token.
pub fn check_contamination(record: &AnalysisRecord) -> PipelineResult<()> {
    let value = Value::Object(record.as_map().clone());
    match find_banned_token(&value) {
        Some(token) => ensure(
            false,
            FailureKind::ContaminationFailure,
            format!("banned token {:?} found in analysis record", token),
        ),
        None => Ok(()),
    }
}

/// Fail with `CompletenessFailure` unless every required section is present
/// and non-empty and there are at least `min_insights` insights.
pub fn check_completeness(record: &AnalysisRecord, min_insights: usize) -> PipelineResult<()> {
    let missing: Vec<&str> = REQUIRED_SECTIONS
        .into_iter()
        .filter(|section| !record.has_section(section))
        .collect();
    ensure(
        missing.is_empty(),
        FailureKind::CompletenessFailure,
        format!("missing or empty sections: {}", missing.join(", ")),
    )?;

    let insights = record.insights().len();
    ensure(
        insights >= min_insights,
        FailureKind::CompletenessFailure,
        format!("{} insights, need at least {}", insights, min_insights),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::analysis_record;
    use serde_json::json;

    #[test]
    fn clean_record_passes_both_gates() {
        let record = analysis_record(20);
        assert!(check_contamination(&record).is_ok());
        assert!(check_completeness(&record, 15).is_ok());
    }

    #[test]
    fn banned_token_is_found_at_any_depth() {
        let value = json!({"a": {"b": [{"c": "A Typical EXAMPLE here"}]}});
        assert_eq!(find_banned_token(&value), Some("example"));
        assert_eq!(find_banned_token(&json!({"n/A": 1})), Some("n/a"));
        assert_eq!(find_banned_token(&json!({"a": "clean"})), None);
    }

    #[test]
    fn contaminated_record_fails() {
        let mut map = analysis_record(20).as_map().clone();
        map["positioning"]["niche"] = json!("Data not available yet");
        let err = check_contamination(&AnalysisRecord::from_map(map)).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ContaminationFailure);
        assert!(err.message().contains("not available"));
    }

    #[test]
    fn fourteen_insights_fail_fifteen_pass() {
        let err = check_completeness(&analysis_record(14), 15).unwrap_err();
        assert_eq!(err.kind(), FailureKind::CompletenessFailure);
        assert!(err.message().contains("14 insights"));

        assert!(check_completeness(&analysis_record(15), 15).is_ok());
    }

    #[test]
    fn empty_section_fails() {
        let mut map = analysis_record(20).as_map().clone();
        map.insert("sales_funnel".into(), json!({}));
        map.remove("action_plan");
        let err = check_completeness(&AnalysisRecord::from_map(map), 15).unwrap_err();
        assert_eq!(err.kind(), FailureKind::CompletenessFailure);
        assert_eq!(
            err.message(),
            "missing or empty sections: sales_funnel, action_plan"
        );
    }
}
