use serde::Serialize;

use super::intent_prediction::{apply_threshold, IntentPrediction};

/// One dataset row after intent scoring. `prediction` is `None` when the
/// scorer failed for this row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredUtterance {
    pub text: String,
    /// Expected intent label from the dataset.
    pub intent: String,
    pub prediction: Option<IntentPrediction>,
    /// Predicted intent after the confidence threshold was applied.
    pub prediction_drop: Option<String>,
}

impl ScoredUtterance {
    pub fn scored(
        text: impl Into<String>,
        intent: impl Into<String>,
        prediction: IntentPrediction,
        threshold: f64,
    ) -> Self {
        let prediction_drop = apply_threshold(&prediction, threshold).to_string();
        Self {
            text: text.into(),
            intent: intent.into(),
            prediction: Some(prediction),
            prediction_drop: Some(prediction_drop),
        }
    }

    pub fn unscored(text: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent: intent.into(),
            prediction: None,
            prediction_drop: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.prediction.is_some()
    }
}
