//! Research quality gate.
//!
//! Runs before any generative call: the model cannot tell thin evidence from
//! rich evidence, so insufficient research must stop the run here.

use super::gate::ensure;
use crate::error::{FailureKind, PipelineResult};
use crate::types::{PipelineConfig, ResearchCorpus};

/// Abort unless the corpus meets both floors.
pub fn check_research_floor(corpus: &ResearchCorpus, config: &PipelineConfig) -> PipelineResult<()> {
    ensure(
        corpus.total_char_count >= config.min_total_chars,
        FailureKind::ResearchInsufficient,
        format!(
            "collected {} characters of research, need at least {}",
            corpus.total_char_count, config.min_total_chars
        ),
    )?;
    ensure(
        corpus.unique_sources() >= config.min_unique_sources,
        FailureKind::ResearchInsufficient,
        format!(
            "collected {} unique sources, need at least {}",
            corpus.unique_sources(),
            config.min_unique_sources
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::corpus_with;

    #[test]
    fn passes_at_the_floor() {
        let corpus = corpus_with(10, 3_000);
        assert!(check_research_floor(&corpus, &PipelineConfig::default()).is_ok());
    }

    #[test]
    fn fails_on_too_few_characters() {
        let corpus = corpus_with(12, 2_000);
        let err = check_research_floor(&corpus, &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ResearchInsufficient);
        assert!(err.message().contains("24000 characters"));
    }

    #[test]
    fn fails_on_too_few_sources() {
        let corpus = corpus_with(9, 4_000);
        let err = check_research_floor(&corpus, &PipelineConfig::default()).unwrap_err();
        assert!(err.message().contains("9 unique sources"));
    }
}
