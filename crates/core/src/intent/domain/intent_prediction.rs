use serde::Serialize;

use crate::shared::constants::NONE_INTENT;

/// Top intent returned by an intent classifier for one utterance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntentPrediction {
    pub top_intent: String,
    pub score: f64,
}

impl IntentPrediction {
    pub fn new(top_intent: impl Into<String>, score: f64) -> Self {
        Self {
            top_intent: top_intent.into(),
            score,
        }
    }
}

/// The top intent when its score reaches `threshold`, otherwise `None`.
pub fn apply_threshold(prediction: &IntentPrediction, threshold: f64) -> &str {
    if prediction.score >= threshold {
        &prediction.top_intent
    } else {
        NONE_INTENT
    }
}
