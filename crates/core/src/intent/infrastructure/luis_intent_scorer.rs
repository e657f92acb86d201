use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intent::domain::intent_prediction::IntentPrediction;
use crate::intent::domain::intent_scorer::{IntentScoreError, IntentScorer};
use crate::shared::constants::LUIS_DEFAULT_SLOT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a LUIS prediction endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LuisSettings {
    pub app_id: String,
    pub key: String,
    /// Resource name, the subdomain of `cognitiveservices.azure.com`.
    pub endpoint: String,
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    LUIS_DEFAULT_SLOT.to_string()
}

impl Default for LuisSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            key: String::new(),
            endpoint: String::new(),
            slot: default_slot(),
        }
    }
}

impl LuisSettings {
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.key.is_empty() && !self.endpoint.is_empty()
    }

    pub fn prediction_url(&self) -> String {
        format!(
            "https://{}.cognitiveservices.azure.com/luis/prediction/v3.0/apps/{}/slots/{}/predict",
            self.endpoint, self.app_id, self.slot
        )
    }
}

/// Scores utterances against the LUIS v3 prediction API.
pub struct LuisIntentScorer {
    client: Client,
    settings: LuisSettings,
}

impl LuisIntentScorer {
    pub fn new(settings: LuisSettings) -> Result<Self, IntentScoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IntentScoreError::Request(Box::new(e)))?;
        Ok(Self { client, settings })
    }
}

impl IntentScorer for LuisIntentScorer {
    fn score(&self, text: &str) -> Result<IntentPrediction, IntentScoreError> {
        let response = self
            .client
            .get(self.settings.prediction_url())
            .query(&[
                ("query", text),
                ("timezoneOffset", "0"),
                ("verbose", "true"),
                ("show-all-intents", "true"),
                ("spellCheck", "false"),
                ("staging", "false"),
                ("subscription-key", self.settings.key.as_str()),
            ])
            .send()
            .map_err(|e| IntentScoreError::Request(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntentScoreError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| IntentScoreError::Request(Box::new(e)))?;
        parse_prediction(&body)
    }
}

/// Extracts the top intent and its score from a prediction response body.
pub fn parse_prediction(body: &str) -> Result<IntentPrediction, IntentScoreError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| IntentScoreError::MalformedResponse(e.to_string()))?;
    let prediction = &json["prediction"];

    let top_intent = prediction["topIntent"].as_str().ok_or_else(|| {
        IntentScoreError::MalformedResponse("missing prediction.topIntent".to_string())
    })?;
    let score = prediction["intents"][top_intent]["score"]
        .as_f64()
        .ok_or_else(|| {
            IntentScoreError::MalformedResponse(format!("missing score for intent '{top_intent}'"))
        })?;

    Ok(IntentPrediction::new(top_intent, score))
}
