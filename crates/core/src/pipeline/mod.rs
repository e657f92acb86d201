pub mod evaluate_transcriptions_use_case;
pub mod pipeline_logger;
pub mod score_intents_use_case;
