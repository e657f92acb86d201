use crate::dataset::domain::dataset::{Dataset, PairColumns};
use crate::evaluation::domain::evaluation_error::EvaluationError;
use crate::evaluation::transcription_evaluator::{Evaluation, TranscriptionEvaluator};

pub struct EvaluateTranscriptionsUseCase {
    evaluator: TranscriptionEvaluator,
    columns: PairColumns,
}

impl EvaluateTranscriptionsUseCase {
    pub fn new(evaluator: TranscriptionEvaluator, columns: PairColumns) -> Self {
        Self { evaluator, columns }
    }

    /// Evaluates every row of `dataset`. Rows the dataset itself rejects are
    /// listed first among the skipped pairs.
    pub fn run(&self, dataset: &Dataset) -> Result<Evaluation, Box<dyn std::error::Error>> {
        let (pairs, rejected) = dataset.utterance_pairs(&self.columns)?;
        let total = pairs.len() + rejected.len();

        let evaluation = match self.evaluator.compute_metrics(&pairs) {
            Ok(evaluation) => evaluation.with_rejected(rejected),
            Err(EvaluationError::EmptyBatch) if !rejected.is_empty() => {
                return Err(EvaluationError::NothingEvaluated { skipped: rejected }.into());
            }
            Err(EvaluationError::NothingEvaluated { skipped }) => {
                let mut all = rejected;
                all.extend(skipped);
                return Err(EvaluationError::NothingEvaluated { skipped: all }.into());
            }
            Err(e) => return Err(e.into()),
        };

        for skipped in &evaluation.skipped {
            log::warn!("Skipped pair '{}': {}", skipped.label, skipped.reason);
        }
        log::info!(
            "Evaluated {}/{} pairs, WER {:.2}%",
            evaluation.aggregate.evaluated,
            total,
            evaluation.aggregate.word_error_rate * 100.0
        );
        Ok(evaluation)
    }
}
