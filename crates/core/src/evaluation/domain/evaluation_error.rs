use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairField {
    Reference,
    Recognized,
    Label,
}

impl fmt::Display for PairField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairField::Reference => write!(f, "reference"),
            PairField::Recognized => write!(f, "recognized"),
            PairField::Label => write!(f, "label"),
        }
    }
}

/// Why a single utterance pair was excluded from an evaluation.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidInput {
    #[error("label '{label}' is already used by another pair")]
    DuplicateLabel { label: String },
    #[error("{field} text is not valid UTF-8")]
    NonTextual { field: PairField },
    #[error("row has {found} cells but the header declares {expected} columns")]
    MalformedRow { expected: usize, found: usize },
}

/// A pair that could not be evaluated, kept so reports never present a
/// partial result as complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedPair {
    pub label: String,
    pub reason: InvalidInput,
}

#[derive(Error, Debug, PartialEq)]
pub enum EvaluationError {
    #[error("batch contains no utterance pairs")]
    EmptyBatch,
    #[error("all {} utterance pairs were skipped", .skipped.len())]
    NothingEvaluated { skipped: Vec<SkippedPair> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_messages() {
        let duplicate = InvalidInput::DuplicateLabel {
            label: "7".to_string(),
        };
        assert_eq!(
            duplicate.to_string(),
            "label '7' is already used by another pair"
        );

        let non_textual = InvalidInput::NonTextual {
            field: PairField::Recognized,
        };
        assert_eq!(non_textual.to_string(), "recognized text is not valid UTF-8");

        let label = InvalidInput::NonTextual {
            field: PairField::Label,
        };
        assert_eq!(label.to_string(), "label text is not valid UTF-8");
    }

    #[test]
    fn test_nothing_evaluated_reports_skip_count() {
        let skipped = vec![
            SkippedPair {
                label: "0".to_string(),
                reason: InvalidInput::MalformedRow {
                    expected: 2,
                    found: 3,
                },
            },
            SkippedPair {
                label: "1".to_string(),
                reason: InvalidInput::NonTextual {
                    field: PairField::Reference,
                },
            },
        ];
        let err = EvaluationError::NothingEvaluated { skipped };
        assert_eq!(err.to_string(), "all 2 utterance pairs were skipped");
    }
}
