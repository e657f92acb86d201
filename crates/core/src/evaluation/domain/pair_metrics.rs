use serde::Serialize;

use super::alignment::EditCounts;

/// Edit count normalized by reference length, with the denominator floored
/// at one so an empty reference scores its insertions instead of dividing
/// by zero. Empty reference and empty recognized text score 0.0.
pub fn word_error_rate(errors: usize, reference_len: usize) -> f64 {
    errors as f64 / reference_len.max(1) as f64
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairMetrics {
    pub label: String,
    pub matches: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub reference_len: usize,
    pub word_error_rate: f64,
}

impl PairMetrics {
    pub fn new(label: impl Into<String>, counts: EditCounts) -> Self {
        let reference_len = counts.reference_len();
        Self {
            label: label.into(),
            matches: counts.matches,
            substitutions: counts.substitutions,
            insertions: counts.insertions,
            deletions: counts.deletions,
            reference_len,
            word_error_rate: word_error_rate(counts.errors(), reference_len),
        }
    }

    pub fn errors(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }
}

/// Totals over every evaluated pair. The error rate is pooled from the
/// summed counts, not averaged over per-pair rates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub evaluated: usize,
    pub skipped: usize,
    pub matches: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub reference_len: usize,
    pub word_error_rate: f64,
}

impl AggregateMetrics {
    pub fn pooled<'a>(pairs: impl IntoIterator<Item = &'a PairMetrics>, skipped: usize) -> Self {
        let mut evaluated = 0;
        let mut counts = EditCounts::default();
        for pair in pairs {
            evaluated += 1;
            counts.matches += pair.matches;
            counts.substitutions += pair.substitutions;
            counts.insertions += pair.insertions;
            counts.deletions += pair.deletions;
        }
        let reference_len = counts.reference_len();
        Self {
            evaluated,
            skipped,
            matches: counts.matches,
            substitutions: counts.substitutions,
            insertions: counts.insertions,
            deletions: counts.deletions,
            reference_len,
            word_error_rate: word_error_rate(counts.errors(), reference_len),
        }
    }

    pub fn errors(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }
}
