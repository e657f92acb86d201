use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::evaluation::transcription_evaluator::Evaluation;
use crate::intent::domain::scored_utterance::ScoredUtterance;

const METRICS_HEADER: [&str; 9] = [
    "label",
    "reference",
    "recognized",
    "matches",
    "substitutions",
    "insertions",
    "deletions",
    "wer",
    "status",
];

/// Label of the trailing row holding the pooled totals.
const AGGREGATE_LABEL: &str = "ALL";

const SCORING_HEADER: [&str; 5] = ["text", "intent", "prediction", "score", "prediction_drop"];

/// Writes one tab-separated row per evaluated pair, then one per skipped
/// pair with empty metric cells, then an `ALL` row with the pooled totals.
/// The `status` column tells the three apart.
pub struct TsvMetricsWriter;

impl TsvMetricsWriter {
    pub fn write<W: Write>(out: &mut W, evaluation: &Evaluation) -> io::Result<()> {
        write_row(out, METRICS_HEADER)?;
        for pair in &evaluation.pairs {
            let metrics = &pair.metrics;
            write_row(
                out,
                [
                    metrics.label.clone(),
                    pair.alignment.reference_tokens().join(" "),
                    pair.alignment.recognized_tokens().join(" "),
                    metrics.matches.to_string(),
                    metrics.substitutions.to_string(),
                    metrics.insertions.to_string(),
                    metrics.deletions.to_string(),
                    format!("{:.4}", metrics.word_error_rate),
                    "evaluated".to_string(),
                ],
            )?;
        }
        for skipped in &evaluation.skipped {
            let mut cells = vec![String::new(); METRICS_HEADER.len()];
            cells[0] = skipped.label.clone();
            cells[8] = format!("skipped: {}", skipped.reason);
            write_row(out, cells)?;
        }

        let aggregate = &evaluation.aggregate;
        write_row(
            out,
            [
                AGGREGATE_LABEL.to_string(),
                String::new(),
                String::new(),
                aggregate.matches.to_string(),
                aggregate.substitutions.to_string(),
                aggregate.insertions.to_string(),
                aggregate.deletions.to_string(),
                format!("{:.4}", aggregate.word_error_rate),
                format!(
                    "aggregate: {} evaluated, {} skipped",
                    aggregate.evaluated, aggregate.skipped
                ),
            ],
        )
    }

    pub fn write_to_path(path: &Path, evaluation: &Evaluation) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        Self::write(&mut out, evaluation)?;
        out.flush()
    }
}

/// Writes intent scoring results, one row per scored utterance. Unscored
/// utterances are written with empty prediction cells.
pub struct TsvScoringWriter;

impl TsvScoringWriter {
    pub fn write<W: Write>(out: &mut W, rows: &[ScoredUtterance]) -> io::Result<()> {
        write_row(out, SCORING_HEADER)?;
        for row in rows {
            let (prediction, score) = match &row.prediction {
                Some(prediction) => (
                    prediction.top_intent.clone(),
                    format!("{:.4}", prediction.score),
                ),
                None => (String::new(), String::new()),
            };
            write_row(
                out,
                [
                    row.text.clone(),
                    row.intent.clone(),
                    prediction,
                    score,
                    row.prediction_drop.clone().unwrap_or_default(),
                ],
            )?;
        }
        Ok(())
    }

    pub fn write_to_path(path: &Path, rows: &[ScoredUtterance]) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        Self::write(&mut out, rows)?;
        out.flush()
    }
}

fn write_row<W: Write, S: AsRef<str>>(
    out: &mut W,
    cells: impl IntoIterator<Item = S>,
) -> io::Result<()> {
    let line: Vec<String> = cells.into_iter().map(|c| clean(c.as_ref())).collect();
    writeln!(out, "{}", line.join("\t"))
}

/// Cells cannot carry the delimiter or line breaks.
fn clean(cell: &str) -> String {
    cell.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::domain::utterance_pair::UtterancePair;
    use crate::evaluation::transcription_evaluator::TranscriptionEvaluator;
    use crate::intent::domain::intent_prediction::IntentPrediction;
    use std::fs;
    use tempfile::TempDir;

    fn evaluation() -> Evaluation {
        TranscriptionEvaluator::default()
            .compute_metrics(&[
                UtterancePair::new("a", "book a  flight", "book flight"),
                UtterancePair::new("b", "yes", "yes"),
            ])
            .unwrap()
    }

    #[test]
    fn test_metrics_rows() {
        let mut out = Vec::new();
        TsvMetricsWriter::write(&mut out, &evaluation()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "label\treference\trecognized\tmatches\tsubstitutions\tinsertions\tdeletions\twer\tstatus"
        );
        assert_eq!(lines[1], "a\tbook a flight\tbook flight\t2\t0\t0\t1\t0.3333\tevaluated");
        assert_eq!(lines[2], "b\tyes\tyes\t1\t0\t0\t0\t0.0000\tevaluated");
        assert_eq!(
            lines[3],
            "ALL\t\t\t3\t0\t0\t1\t0.2500\taggregate: 2 evaluated, 0 skipped"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_skipped_pairs_are_listed_before_the_aggregate() {
        let evaluation = TranscriptionEvaluator::default()
            .compute_metrics(&[
                UtterancePair::new("a", "yes", "yes"),
                UtterancePair::new("a", "no", "no"),
            ])
            .unwrap();

        let mut out = Vec::new();
        TsvMetricsWriter::write(&mut out, &evaluation).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "a\t\t\t\t\t\t\t\tskipped: label 'a' is already used by another pair"
        );
        assert!(lines[3].ends_with("aggregate: 1 evaluated, 1 skipped"));
    }

    #[test]
    fn test_metrics_written_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.tsv");
        TsvMetricsWriter::write_to_path(&path, &evaluation()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_scoring_rows_leave_unscored_cells_empty() {
        let rows = vec![
            ScoredUtterance {
                text: "book a flight".to_string(),
                intent: "Book_Flight".to_string(),
                prediction: Some(IntentPrediction::new("Book_Flight", 0.5)),
                prediction_drop: Some("None".to_string()),
            },
            ScoredUtterance {
                text: "cancel\tit".to_string(),
                intent: "Cancel".to_string(),
                prediction: None,
                prediction_drop: None,
            },
        ];

        let mut out = Vec::new();
        TsvScoringWriter::write(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "text\tintent\tprediction\tscore\tprediction_drop");
        assert_eq!(lines[1], "book a flight\tBook_Flight\tBook_Flight\t0.5000\tNone");
        assert_eq!(lines[2], "cancel it\tCancel\t\t\t");
    }
}
