//! The single hard-gate primitive.
//!
//! Every "fail loud, never simulate" check in the pipeline goes through
//! [`ensure`]: no retry, no remediation, one tagged error. The orchestrator
//! logs the failure once, with its stage.

use crate::error::{FailureKind, PipelineError, PipelineResult};

/// Pass when `condition` holds, otherwise fail with `kind` and `message`.
pub fn ensure(condition: bool, kind: FailureKind, message: impl Into<String>) -> PipelineResult<()> {
    if condition {
        return Ok(());
    }
    Err(PipelineError::new(kind, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_when_condition_holds() {
        assert!(ensure(true, FailureKind::ScoreFailure, "unused").is_ok());
    }

    #[test]
    fn fails_with_kind_and_message() {
        let err = ensure(false, FailureKind::ScoreFailure, "84.0 < 85.0").unwrap_err();
        assert_eq!(err, PipelineError::ScoreFailure("84.0 < 85.0".into()));
    }
}
