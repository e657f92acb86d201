use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset has no header row")]
    MissingHeader,
    #[error("header column {index} is not valid UTF-8")]
    UndecodableHeader { index: usize },
    #[error("dataset has no '{0}' column")]
    MissingColumn(String),
    #[error("transcription line {line} has an undecodable audio name")]
    UndecodableAudio { line: usize },
}
