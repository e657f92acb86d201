pub mod alignment;
pub mod error_catalog;
pub mod evaluation_error;
pub mod pair_metrics;
pub mod utterance_pair;
