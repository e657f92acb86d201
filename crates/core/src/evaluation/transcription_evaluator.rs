use std::collections::HashSet;

use serde::Serialize;

use crate::evaluation::domain::alignment::Alignment;
use crate::evaluation::domain::error_catalog::ErrorCatalog;
use crate::evaluation::domain::evaluation_error::{
    EvaluationError, InvalidInput, PairField, SkippedPair,
};
use crate::evaluation::domain::pair_metrics::{AggregateMetrics, PairMetrics};
use crate::evaluation::domain::utterance_pair::{tokenize, UtterancePair};
use crate::evaluation::pair_executor::{PairExecutor, SequentialPairExecutor};
use crate::shared::text_cell::TextCell;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairEvaluation {
    pub metrics: PairMetrics,
    pub alignment: Alignment,
}

/// Aligns and scores a single pair.
pub fn evaluate_pair(pair: &UtterancePair) -> Result<PairEvaluation, InvalidInput> {
    let reference = text_of(&pair.reference, PairField::Reference)?;
    let recognized = text_of(&pair.recognized, PairField::Recognized)?;

    let alignment = Alignment::between(&tokenize(reference), &tokenize(recognized));
    let metrics = PairMetrics::new(pair.label.clone(), alignment.counts());
    Ok(PairEvaluation { metrics, alignment })
}

fn text_of(cell: &TextCell, field: PairField) -> Result<&str, InvalidInput> {
    cell.as_text().ok_or(InvalidInput::NonTextual { field })
}

/// Result of one evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub pairs: Vec<PairEvaluation>,
    pub aggregate: AggregateMetrics,
    pub catalog: ErrorCatalog,
    pub skipped: Vec<SkippedPair>,
}

impl Evaluation {
    fn reduce(pairs: Vec<PairEvaluation>, skipped: Vec<SkippedPair>) -> Self {
        let aggregate = AggregateMetrics::pooled(pairs.iter().map(|p| &p.metrics), skipped.len());
        let mut catalog = ErrorCatalog::new();
        for pair in &pairs {
            catalog.record(&pair.alignment);
        }
        Self {
            pairs,
            aggregate,
            catalog,
            skipped,
        }
    }

    /// Records pairs rejected before they reached the evaluator, placing
    /// them ahead of the evaluator's own skips.
    pub fn with_rejected(mut self, mut rejected: Vec<SkippedPair>) -> Self {
        if rejected.is_empty() {
            return self;
        }
        rejected.append(&mut self.skipped);
        self.skipped = rejected;
        self.aggregate.skipped = self.skipped.len();
        self
    }
}

/// Computes word-level error metrics over a batch of utterance pairs.
///
/// A bad pair never aborts the batch: duplicate labels and undecodable text
/// are reported in [`Evaluation::skipped`] and left out of the aggregate.
pub struct TranscriptionEvaluator {
    executor: Box<dyn PairExecutor>,
}

impl TranscriptionEvaluator {
    pub fn new(executor: Box<dyn PairExecutor>) -> Self {
        Self { executor }
    }

    pub fn compute_metrics(&self, pairs: &[UtterancePair]) -> Result<Evaluation, EvaluationError> {
        if pairs.is_empty() {
            return Err(EvaluationError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(pairs.len());
        let mut unique = Vec::with_capacity(pairs.len());
        let mut skipped: Vec<(usize, SkippedPair)> = Vec::new();
        for (index, pair) in pairs.iter().enumerate() {
            if seen.insert(pair.label.as_str()) {
                unique.push((index, pair));
            } else {
                skipped.push((
                    index,
                    SkippedPair {
                        label: pair.label.clone(),
                        reason: InvalidInput::DuplicateLabel {
                            label: pair.label.clone(),
                        },
                    },
                ));
            }
        }

        let batch: Vec<&UtterancePair> = unique.iter().map(|(_, pair)| *pair).collect();
        let outcomes = self.executor.evaluate(&batch);

        let mut evaluated = Vec::with_capacity(outcomes.len());
        for ((index, pair), outcome) in unique.into_iter().zip(outcomes) {
            match outcome {
                Ok(evaluation) => evaluated.push(evaluation),
                Err(reason) => {
                    log::debug!("Skipping pair '{}': {reason}", pair.label);
                    skipped.push((
                        index,
                        SkippedPair {
                            label: pair.label.clone(),
                            reason,
                        },
                    ));
                }
            }
        }
        skipped.sort_by_key(|(index, _)| *index);
        let skipped: Vec<SkippedPair> = skipped.into_iter().map(|(_, s)| s).collect();

        if evaluated.is_empty() {
            return Err(EvaluationError::NothingEvaluated { skipped });
        }

        Ok(Evaluation::reduce(evaluated, skipped))
    }
}

impl Default for TranscriptionEvaluator {
    fn default() -> Self {
        Self::new(Box::new(SequentialPairExecutor))
    }
}
