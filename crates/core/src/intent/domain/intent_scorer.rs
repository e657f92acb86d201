use thiserror::Error;

use super::intent_prediction::IntentPrediction;

#[derive(Error, Debug)]
pub enum IntentScoreError {
    #[error("intent request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("intent service returned HTTP {status}")]
    Status { status: u16 },
    #[error("unexpected intent response: {0}")]
    MalformedResponse(String),
}

/// Classifies the intent of a single utterance.
pub trait IntentScorer {
    fn score(&self, text: &str) -> Result<IntentPrediction, IntentScoreError>;
}
