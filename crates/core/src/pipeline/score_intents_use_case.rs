use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::dataset::domain::dataset::Dataset;
use crate::intent::domain::classification_report::ClassificationReport;
use crate::intent::domain::confusion_matrix::ConfusionMatrix;
use crate::intent::domain::intent_scorer::IntentScorer;
use crate::intent::domain::scored_utterance::ScoredUtterance;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::{DEFAULT_REFERENCE_COLUMN, INTENT_COLUMN};

#[derive(Error, Debug, PartialEq)]
pub enum ScoreIntentsError {
    #[error("dataset has no utterances to score")]
    NothingToScore,
    #[error("none of the {attempted} utterances could be scored")]
    NothingScored { attempted: usize },
}

/// Intent scoring results with reports before and after the confidence
/// threshold. Reports and the confusion matrix cover scored rows only; the
/// confusion matrix compares expected intents with the raw top intent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntentScoring {
    pub rows: Vec<ScoredUtterance>,
    pub report_raw: ClassificationReport,
    pub report_thresholded: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

impl IntentScoring {
    /// Builds both reports and the confusion matrix from already scored rows,
    /// e.g. rows read back from a scoring file.
    pub fn from_rows(rows: Vec<ScoredUtterance>) -> Self {
        let raw: Vec<(&str, &str)> = rows
            .iter()
            .filter_map(|row| {
                row.prediction
                    .as_ref()
                    .map(|p| (row.intent.as_str(), p.top_intent.as_str()))
            })
            .collect();
        let report_raw = ClassificationReport::new(raw.iter().copied());
        let confusion = ConfusionMatrix::new(raw.iter().copied());

        let thresholded = rows.iter().filter_map(|row| {
            row.prediction_drop
                .as_deref()
                .map(|p| (row.intent.as_str(), p))
        });
        let report_thresholded = ClassificationReport::new(thresholded);

        Self {
            rows,
            report_raw,
            report_thresholded,
            confusion,
        }
    }

    pub fn scored(&self) -> impl Iterator<Item = &ScoredUtterance> {
        self.rows.iter().filter(|row| row.is_scored())
    }
}

pub struct ScoreIntentsUseCase {
    scorer: Box<dyn IntentScorer>,
    threshold: f64,
    request_interval: Duration,
    text_column: String,
}

impl ScoreIntentsUseCase {
    pub fn new(scorer: Box<dyn IntentScorer>, threshold: f64, request_interval: Duration) -> Self {
        Self {
            scorer,
            threshold,
            request_interval,
            text_column: DEFAULT_REFERENCE_COLUMN.to_string(),
        }
    }

    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_column = column.into();
        self
    }

    /// Scores the text of every well-formed row against its `intent` label.
    ///
    /// A failed request leaves the row unscored and the run continues.
    /// Consecutive requests are spaced by `request_interval`.
    pub fn run(
        &self,
        dataset: &Dataset,
        logger: &mut dyn PipelineLogger,
    ) -> Result<IntentScoring, Box<dyn std::error::Error>> {
        let text = dataset.require_column(&self.text_column)?;
        let intent = dataset.require_column(INTENT_COLUMN)?;

        let utterances: Vec<(String, String)> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                if let Some(reason) = row.shape_error() {
                    log::warn!("Skipping row {index}: {reason}");
                    return None;
                }
                let cell = |column| {
                    row.cell(column)
                        .map(|c| c.to_lossy().into_owned())
                        .unwrap_or_default()
                };
                Some((cell(text), cell(intent)))
            })
            .collect();

        if utterances.is_empty() {
            return Err(ScoreIntentsError::NothingToScore.into());
        }

        let total = utterances.len();
        let mut rows = Vec::with_capacity(total);
        for (index, (text, intent)) in utterances.into_iter().enumerate() {
            if index > 0 && !self.request_interval.is_zero() {
                thread::sleep(self.request_interval);
            }

            let started = Instant::now();
            let outcome = self.scorer.score(&text);
            logger.timing("request", started.elapsed().as_secs_f64() * 1000.0);

            rows.push(match outcome {
                Ok(prediction) => ScoredUtterance::scored(text, intent, prediction, self.threshold),
                Err(e) => {
                    log::warn!("Could not score '{text}': {e}");
                    ScoredUtterance::unscored(text, intent)
                }
            });
            logger.progress(index + 1, total);
        }

        let scoring = IntentScoring::from_rows(rows);
        let scored = scoring.scored().count();
        if scored == 0 {
            return Err(ScoreIntentsError::NothingScored { attempted: total }.into());
        }
        logger.info(&format!(
            "Scored {scored}/{total} utterances, thresholded accuracy {:.2}",
            scoring.report_thresholded.accuracy
        ));
        logger.summary();
        Ok(scoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::infrastructure::tsv_dataset_reader::TsvDatasetReader;
    use crate::intent::domain::intent_prediction::IntentPrediction;
    use crate::intent::domain::intent_scorer::IntentScoreError;
    use crate::pipeline::pipeline_logger::{LogPipelineLogger, NullPipelineLogger};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct StubScorer {
        answers: HashMap<&'static str, (&'static str, f64)>,
    }

    impl StubScorer {
        fn new(answers: &[(&'static str, &'static str, f64)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(text, intent, score)| (*text, (*intent, *score)))
                    .collect(),
            }
        }
    }

    impl IntentScorer for StubScorer {
        fn score(&self, text: &str) -> Result<IntentPrediction, IntentScoreError> {
            self.answers
                .get(text)
                .map(|(intent, score)| IntentPrediction::new(*intent, *score))
                .ok_or(IntentScoreError::Status { status: 503 })
        }
    }

    fn dataset() -> Dataset {
        TsvDatasetReader::new()
            .parse(
                b"text\tintent\n\
                  book a flight\tBook_Flight\n\
                  cancel it\tCancel\n\
                  what is the weather\tWeather\n",
            )
            .unwrap()
    }

    fn use_case(scorer: StubScorer) -> ScoreIntentsUseCase {
        ScoreIntentsUseCase::new(Box::new(scorer), 0.85, Duration::ZERO)
    }

    #[test]
    fn test_scores_every_row_and_applies_threshold() {
        let scorer = StubScorer::new(&[
            ("book a flight", "Book_Flight", 0.97),
            ("cancel it", "Cancel", 0.60),
            ("what is the weather", "Book_Flight", 0.90),
        ]);

        let scoring = use_case(scorer)
            .run(&dataset(), &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(scoring.rows.len(), 3);
        assert_eq!(scoring.rows[1].prediction_drop.as_deref(), Some("None"));
        assert_relative_eq!(scoring.report_raw.accuracy, 2.0 / 3.0);
        assert_relative_eq!(scoring.report_thresholded.accuracy, 1.0 / 3.0);
        assert_eq!(scoring.confusion.count("Cancel", "Cancel"), 1);
        assert_eq!(scoring.confusion.count("Cancel", "None"), 0);
        assert_eq!(scoring.confusion.count("Weather", "Book_Flight"), 1);
    }

    #[test]
    fn test_from_rows_skips_unscored_rows() {
        let scoring = IntentScoring::from_rows(vec![
            ScoredUtterance::scored("hi", "Greet", IntentPrediction::new("Greet", 0.5), 0.85),
            ScoredUtterance::unscored("bye", "Leave"),
        ]);

        assert_eq!(scoring.report_raw.support(), 1);
        assert_relative_eq!(scoring.report_raw.accuracy, 1.0);
        assert_relative_eq!(scoring.report_thresholded.accuracy, 0.0);
        assert_eq!(scoring.confusion.count("Greet", "Greet"), 1);
        assert!(!scoring.confusion.labels().iter().any(|l| l == "Leave"));
    }

    #[test]
    fn test_failed_requests_leave_rows_unscored() {
        let scorer = StubScorer::new(&[("book a flight", "Book_Flight", 0.97)]);

        let scoring = use_case(scorer)
            .run(&dataset(), &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(scoring.rows.len(), 3);
        assert_eq!(scoring.scored().count(), 1);
        assert!(!scoring.rows[2].is_scored());
        assert_eq!(scoring.report_raw.support(), 1);
    }

    #[test]
    fn test_nothing_scored_is_an_error() {
        let err = use_case(StubScorer::new(&[]))
            .run(&dataset(), &mut NullPipelineLogger)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScoreIntentsError>(),
            Some(&ScoreIntentsError::NothingScored { attempted: 3 })
        );
    }

    #[test]
    fn test_requires_intent_column() {
        let dataset = TsvDatasetReader::new().parse(b"text\nhello\n").unwrap();
        let err = use_case(StubScorer::new(&[]))
            .run(&dataset, &mut NullPipelineLogger)
            .unwrap_err();
        assert_eq!(err.to_string(), "dataset has no 'intent' column");
    }

    #[test]
    fn test_custom_text_column() {
        let dataset = TsvDatasetReader::new()
            .parse(b"rec\tintent\nhi there\tGreet\n")
            .unwrap();
        let scorer = StubScorer::new(&[("hi there", "Greet", 0.99)]);

        let scoring = use_case(scorer)
            .with_text_column("rec")
            .run(&dataset, &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(scoring.rows[0].prediction_drop.as_deref(), Some("Greet"));
    }

    #[test]
    fn test_records_request_timings() {
        let scorer = StubScorer::new(&[("book a flight", "Book_Flight", 0.97)]);
        let mut logger = LogPipelineLogger::new(1);

        use_case(scorer).run(&dataset(), &mut logger).unwrap();

        assert_eq!(logger.timings_for("request").map(<[f64]>::len), Some(3));
    }
}
