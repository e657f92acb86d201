pub mod dataset;
pub mod dataset_error;
pub mod transcription;
