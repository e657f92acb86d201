pub mod domain;
pub mod infrastructure;
pub mod pair_executor;
pub mod transcription_evaluator;
