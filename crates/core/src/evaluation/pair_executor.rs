use crate::evaluation::domain::evaluation_error::InvalidInput;
use crate::evaluation::domain::utterance_pair::UtterancePair;
use crate::evaluation::transcription_evaluator::{evaluate_pair, PairEvaluation};

pub type PairOutcome = Result<PairEvaluation, InvalidInput>;

/// Abstracts how the independent per-pair alignments of a batch are run.
///
/// Implementations must return exactly one outcome per input pair, in input
/// order, so the reduction that follows is deterministic.
pub trait PairExecutor: Send + Sync {
    fn evaluate(&self, pairs: &[&UtterancePair]) -> Vec<PairOutcome>;
}

/// Evaluates pairs one after another on the calling thread.
pub struct SequentialPairExecutor;

impl PairExecutor for SequentialPairExecutor {
    fn evaluate(&self, pairs: &[&UtterancePair]) -> Vec<PairOutcome> {
        pairs.iter().map(|pair| evaluate_pair(pair)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::text_cell::TextCell;

    #[test]
    fn test_sequential_preserves_order() {
        let a = UtterancePair::new("a", "one", "one");
        let b = UtterancePair::new("b", TextCell::Undecodable(vec![0xff]), "two");
        let c = UtterancePair::new("c", "three", "tree");

        let outcomes = SequentialPairExecutor.evaluate(&[&a, &b, &c]);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap().metrics.label, "a");
        assert!(outcomes[1].is_err());
        assert_eq!(outcomes[2].as_ref().unwrap().metrics.substitutions, 1);
    }
}
