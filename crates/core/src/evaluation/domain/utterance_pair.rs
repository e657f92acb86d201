use serde::Serialize;

use crate::shared::text_cell::TextCell;

/// One reference/recognized pair, identified by a label unique within a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UtterancePair {
    pub label: String,
    pub reference: TextCell,
    pub recognized: TextCell,
}

impl UtterancePair {
    pub fn new(
        label: impl Into<String>,
        reference: impl Into<TextCell>,
        recognized: impl Into<TextCell>,
    ) -> Self {
        Self {
            label: label.into(),
            reference: reference.into(),
            recognized: recognized.into(),
        }
    }
}

/// Splits text on any run of whitespace. Empty or blank text yields no tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
