pub mod classification_report;
pub mod confusion_matrix;
pub mod intent_prediction;
pub mod intent_scorer;
pub mod scored_utterance;
