use std::path::Path;

use thiserror::Error;

use crate::dataset::domain::dataset::{Dataset, Row};
use crate::dataset::domain::dataset_error::DatasetError;
use crate::dataset::infrastructure::tsv_dataset_reader::TsvDatasetReader;
use crate::intent::domain::intent_prediction::IntentPrediction;
use crate::intent::domain::scored_utterance::ScoredUtterance;
use crate::shared::constants::{DEFAULT_REFERENCE_COLUMN, INTENT_COLUMN};

const PREDICTION_COLUMN: &str = "prediction";
const SCORE_COLUMN: &str = "score";
/// Accepted names of the thresholded prediction column, in lookup order.
const DROP_COLUMNS: [&str; 2] = ["prediction_drop", "drop"];

#[derive(Error, Debug)]
pub enum ScoringFileError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("scoring file has none of the columns {}", DROP_COLUMNS.join(", "))]
    MissingDropColumn,
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Reads a previously written intent scoring file back into scored rows,
/// so reports can be rebuilt without calling the scoring service.
///
/// A row with an empty `prediction` cell is unscored. A scored row needs a
/// numeric `score` and a thresholded prediction.
pub struct TsvScoringReader {
    reader: TsvDatasetReader,
}

impl TsvScoringReader {
    pub fn new(reader: TsvDatasetReader) -> Self {
        Self { reader }
    }

    pub fn read(&self, path: &Path) -> Result<Vec<ScoredUtterance>, ScoringFileError> {
        let dataset = self.reader.read(path)?;
        let rows = rows_of(&dataset)?;
        log::debug!("Read {} scoring rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<ScoredUtterance>, ScoringFileError> {
        rows_of(&self.reader.parse(bytes)?)
    }
}

impl Default for TsvScoringReader {
    fn default() -> Self {
        Self::new(TsvDatasetReader::new())
    }
}

fn rows_of(dataset: &Dataset) -> Result<Vec<ScoredUtterance>, ScoringFileError> {
    let text = dataset.require_column(DEFAULT_REFERENCE_COLUMN)?;
    let intent = dataset.require_column(INTENT_COLUMN)?;
    let prediction = dataset.require_column(PREDICTION_COLUMN)?;
    let score = dataset.require_column(SCORE_COLUMN)?;
    let drop = DROP_COLUMNS
        .iter()
        .find_map(|name| dataset.column_index(name))
        .ok_or(ScoringFileError::MissingDropColumn)?;

    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let invalid = |reason: String| ScoringFileError::InvalidRow { row: index, reason };
            if let Some(reason) = row.shape_error() {
                return Err(invalid(reason.to_string()));
            }

            let text = cell(row, text);
            let intent = cell(row, intent);
            let Some(top_intent) = row.cell(prediction).map(|c| c.to_lossy().into_owned()) else {
                return Ok(ScoredUtterance::unscored(text, intent));
            };

            let raw_score = cell(row, score);
            let score = raw_score
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(format!("score '{raw_score}' is not a number")))?;
            let prediction_drop = row
                .cell(drop)
                .map(|c| c.to_lossy().into_owned())
                .ok_or_else(|| invalid("scored row has no thresholded prediction".to_string()))?;

            Ok(ScoredUtterance {
                text,
                intent,
                prediction: Some(IntentPrediction::new(top_intent, score)),
                prediction_drop: Some(prediction_drop),
            })
        })
        .collect()
}

fn cell(row: &Row, column: usize) -> String {
    row.cell(column)
        .map(|c| c.to_lossy().into_owned())
        .unwrap_or_default()
}
