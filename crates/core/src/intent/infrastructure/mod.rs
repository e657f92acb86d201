pub mod luis_intent_scorer;
pub mod tsv_scoring_reader;
