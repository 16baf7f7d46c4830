//! Support decision over retrieval results.

use crate::types::RetrievalResult;

/// Decides whether a retrieval result (or conversational context) justifies
/// a direct answer.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalGate {
    min_chunks: usize,
    min_score: f32,
}

impl RetrievalGate {
    pub fn new(min_chunks: usize, min_score: f32) -> Self {
        Self {
            min_chunks,
            min_score,
        }
    }

    /// A conversation reference with history is supported on its own;
    /// otherwise the retrieval result has to carry the answer.
    pub fn is_supported(
        &self,
        result: &RetrievalResult,
        conversation_ref: bool,
        history_non_empty: bool,
    ) -> bool {
        (conversation_ref && history_non_empty) || self.retrieval_supports(result)
    }

    /// Unscored results are never trusted alone.
    pub fn retrieval_supports(&self, result: &RetrievalResult) -> bool {
        if result.is_empty() || result.documents.len() < self.min_chunks {
            return false;
        }

        if !result.method.is_scored() {
            return false;
        }

        result
            .max_score()
            .is_some_and(|score| score >= self.min_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetrievalMethod;

    fn scored(scores: &[f32]) -> RetrievalResult {
        RetrievalResult::new(
            scores.iter().map(|s| format!("doc {}", s)).collect(),
            scores.to_vec(),
            RetrievalMethod::Vector,
        )
    }

    #[test]
    fn test_empty_result_is_unsupported() {
        let gate = RetrievalGate::new(1, 0.2);
        assert!(!gate.is_supported(&RetrievalResult::none(), false, true));
        assert!(!gate.is_supported(&scored(&[]), false, false));
    }

    #[test]
    fn test_below_min_count_unsupported_even_with_perfect_score() {
        let gate = RetrievalGate::new(3, 0.2);
        assert!(!gate.is_supported(&scored(&[1.0, 1.0]), false, false));
        assert!(gate.is_supported(&scored(&[1.0, 0.1, 0.1]), false, false));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let gate = RetrievalGate::new(1, 0.5);
        assert!(gate.is_supported(&scored(&[0.5]), false, false));
        assert!(gate.is_supported(&scored(&[0.1, 0.7]), false, false));
        assert!(!gate.is_supported(&scored(&[0.49, 0.3]), false, false));
    }

    #[test]
    fn test_unscored_results_never_supported_alone() {
        let gate = RetrievalGate::new(1, 0.0);
        let result = RetrievalResult::new(
            vec!["a".into(), "b".into()],
            Vec::new(),
            RetrievalMethod::Unscored,
        );
        assert!(!gate.is_supported(&result, false, true));
    }

    #[test]
    fn test_scored_method_without_scores_is_unsupported() {
        let gate = RetrievalGate::new(1, 0.0);
        let result = RetrievalResult::new(vec!["a".into()], Vec::new(), RetrievalMethod::Vector);
        assert!(!gate.retrieval_supports(&result));
    }

    #[test]
    fn test_conversation_reference_with_history_short_circuits() {
        let gate = RetrievalGate::new(1, 0.9);
        assert!(gate.is_supported(&RetrievalResult::none(), true, true));
        assert!(!gate.is_supported(&RetrievalResult::none(), true, false));
        assert!(!gate.is_supported(&RetrievalResult::none(), false, true));
    }
}
