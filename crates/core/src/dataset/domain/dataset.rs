use std::collections::HashMap;

use super::dataset_error::DatasetError;
use super::transcription::Transcription;
use crate::evaluation::domain::evaluation_error::{InvalidInput, PairField, SkippedPair};
use crate::evaluation::domain::utterance_pair::UtterancePair;
use crate::shared::constants::{AUDIO_COLUMN, DEFAULT_RECOGNIZED_COLUMN, DEFAULT_REFERENCE_COLUMN};
use crate::shared::text_cell::TextCell;

/// A dataset row. Cells beyond the header width are dropped on construction
/// but remembered so the row can be rejected as malformed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<Option<TextCell>>,
    overflow: Option<InvalidInput>,
}

impl Row {
    pub fn fit(mut cells: Vec<Option<TextCell>>, header_width: usize) -> Self {
        let overflow = (cells.len() > header_width).then(|| InvalidInput::MalformedRow {
            expected: header_width,
            found: cells.len(),
        });
        cells.truncate(header_width);
        Self { cells, overflow }
    }

    /// `None` for missing cells, including cells past the end of a short row.
    pub fn cell(&self, index: usize) -> Option<&TextCell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn set(&mut self, index: usize, value: Option<TextCell>) {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, None);
        }
        self.cells[index] = value;
    }

    pub fn is_malformed(&self) -> bool {
        self.overflow.is_some()
    }

    pub fn shape_error(&self) -> Option<&InvalidInput> {
        self.overflow.as_ref()
    }
}

/// Which columns feed the utterance pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairColumns {
    pub reference: String,
    pub recognized: String,
    /// Explicit label column; the 0-based row index when unset.
    pub label: Option<String>,
}

impl Default for PairColumns {
    fn default() -> Self {
        Self {
            reference: DEFAULT_REFERENCE_COLUMN.to_string(),
            recognized: DEFAULT_RECOGNIZED_COLUMN.to_string(),
            label: None,
        }
    }
}

/// Tabular input with a named header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<TextCell>>>) -> Self {
        let width = columns.len();
        let rows = rows.into_iter().map(|cells| Row::fit(cells, width)).collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, DatasetError> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// Left-joins recognition results on the `audio` column into `rec`.
    ///
    /// The `rec` column is created when absent and overwritten otherwise.
    /// Rows without a matching transcription get a missing cell. When the
    /// same audio name appears twice in `transcriptions`, the last one wins.
    /// Returns the number of rows that received a transcription.
    pub fn merge_transcriptions(
        &mut self,
        transcriptions: &[Transcription],
    ) -> Result<usize, DatasetError> {
        let audio = self.require_column(AUDIO_COLUMN)?;
        let rec = match self.column_index(DEFAULT_RECOGNIZED_COLUMN) {
            Some(index) => index,
            None => {
                self.columns.push(DEFAULT_RECOGNIZED_COLUMN.to_string());
                self.columns.len() - 1
            }
        };

        let by_audio: HashMap<&str, &TextCell> = transcriptions
            .iter()
            .map(|t| (t.audio.as_str(), &t.recognized))
            .collect();

        let mut matched = 0;
        for row in &mut self.rows {
            let found = row
                .cell(audio)
                .and_then(TextCell::as_text)
                .and_then(|name| by_audio.get(name))
                .map(|cell| (*cell).clone());
            if found.is_some() {
                matched += 1;
            }
            row.set(rec, found);
        }
        Ok(matched)
    }

    /// Builds one utterance pair per well-formed row. Missing cells become
    /// empty text; malformed rows are returned as skipped pairs.
    ///
    /// Without a label column the row index is the label. With one, a
    /// missing label cell reads as `#<index>` so it cannot collide with a
    /// real label, and an undecodable label rejects the row.
    pub fn utterance_pairs(
        &self,
        columns: &PairColumns,
    ) -> Result<(Vec<UtterancePair>, Vec<SkippedPair>), DatasetError> {
        let reference = self.require_column(&columns.reference)?;
        let recognized = self.require_column(&columns.recognized)?;
        let label_column = columns
            .label
            .as_deref()
            .map(|name| self.require_column(name))
            .transpose()?;

        let mut pairs = Vec::with_capacity(self.rows.len());
        let mut rejected = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            let (label, label_error) = match label_column {
                None => (index.to_string(), None),
                Some(column) => match row.cell(column) {
                    Some(TextCell::Text(label)) => (label.clone(), None),
                    Some(TextCell::Undecodable(_)) => (
                        format!("#{index}"),
                        Some(InvalidInput::NonTextual {
                            field: PairField::Label,
                        }),
                    ),
                    None => (format!("#{index}"), None),
                },
            };

            if let Some(reason) = row.shape_error().cloned().or(label_error) {
                rejected.push(SkippedPair { label, reason });
                continue;
            }

            pairs.push(UtterancePair {
                label,
                reference: row.cell(reference).cloned().unwrap_or_default(),
                recognized: row.cell(recognized).cloned().unwrap_or_default(),
            });
        }
        Ok((pairs, rejected))
    }
}
