use std::fs;
use std::path::Path;

use crate::dataset::domain::dataset::Dataset;
use crate::dataset::domain::dataset_error::DatasetError;
use crate::dataset::domain::transcription::Transcription;
use crate::shared::constants::DATASET_DELIMITER;
use crate::shared::text_cell::TextCell;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Reads delimiter-separated datasets and transcription files.
///
/// Lines are split on `\n` with an optional trailing `\r`; empty lines are
/// ignored. Empty cells read as missing, so a line holding only delimiters
/// is a row of missing cells. There is no quoting: the delimiter never
/// appears inside a cell.
pub struct TsvDatasetReader {
    delimiter: u8,
}

impl TsvDatasetReader {
    pub fn new() -> Self {
        Self {
            delimiter: DATASET_DELIMITER,
        }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn read(&self, path: &Path) -> Result<Dataset, DatasetError> {
        let bytes = read_bytes(path)?;
        let dataset = self.parse(&bytes)?;
        log::debug!(
            "Read {} rows x {} columns from {}",
            dataset.len(),
            dataset.columns().len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses a dataset whose first non-empty line is the header.
    pub fn parse(&self, bytes: &[u8]) -> Result<Dataset, DatasetError> {
        let mut lines = lines(strip_bom(bytes));
        let header = lines.next().ok_or(DatasetError::MissingHeader)?;

        let columns = self
            .split(header)
            .enumerate()
            .map(|(index, cell)| {
                std::str::from_utf8(cell)
                    .map(|name| name.trim().to_string())
                    .map_err(|_| DatasetError::UndecodableHeader { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = lines
            .map(|line| self.split(line).map(cell).collect())
            .collect();

        Ok(Dataset::new(columns, rows))
    }

    pub fn read_transcriptions(&self, path: &Path) -> Result<Vec<Transcription>, DatasetError> {
        let bytes = read_bytes(path)?;
        self.parse_transcriptions(&bytes)
    }

    /// Parses headerless `audio<delimiter>recognized` lines. A line without a
    /// delimiter has an empty recognition.
    pub fn parse_transcriptions(&self, bytes: &[u8]) -> Result<Vec<Transcription>, DatasetError> {
        let mut transcriptions = Vec::new();
        for (index, line) in lines(strip_bom(bytes)).enumerate() {
            let (audio, recognized) = match line.iter().position(|b| *b == self.delimiter) {
                Some(at) => (&line[..at], &line[at + 1..]),
                None => (line, &[][..]),
            };
            let audio = std::str::from_utf8(audio)
                .map_err(|_| DatasetError::UndecodableAudio { line: index + 1 })?;
            transcriptions.push(Transcription::new(audio, TextCell::from_bytes(recognized)));
        }
        Ok(transcriptions)
    }

    fn split<'a>(&self, line: &'a [u8]) -> impl Iterator<Item = &'a [u8]> {
        let delimiter = self.delimiter;
        line.split(move |b| *b == delimiter)
    }
}

impl Default for TsvDatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DatasetError> {
    fs::read(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
}

fn cell(bytes: &[u8]) -> Option<TextCell> {
    if bytes.is_empty() {
        None
    } else {
        Some(TextCell::from_bytes(bytes))
    }
}
