//! Model response parsing.
//!
//! Fence stripping is a separate text step ahead of the JSON parser. Invalid
//! JSON is never repaired or retried.

use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};
use crate::types::AnalysisRecord;

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` (with or without a
/// language tag). Text without a fence is returned trimmed.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + 7..];
        if let Some(end) = body.rfind("```") {
            return body[..end].trim();
        }
    }
    if let Some(start) = trimmed.find("```") {
        let after = start + 3;
        // Skip a language identifier on the fence line
        let body_start = trimmed[after..]
            .find('\n')
            .map(|i| after + i + 1)
            .unwrap_or(after);
        if let Some(end) = trimmed[body_start..].rfind("```") {
            return trimmed[body_start..body_start + end].trim();
        }
    }

    trimmed
}

/// Parse model output as a top-level JSON object.
pub fn parse_json_object(response: &str) -> Result<serde_json::Map<String, Value>, String> {
    let body = strip_code_fences(response);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_type(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse the analysis response into a record.
pub fn parse_analysis(response: &str) -> PipelineResult<AnalysisRecord> {
    parse_json_object(response)
        .map(AnalysisRecord::from_map)
        .map_err(PipelineError::ParseFailure)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
