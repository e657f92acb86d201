use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelScores {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AveragedScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-label precision, recall and F1 over (expected, predicted) intent
/// pairs. Labels are the sorted union of both sides; a ratio with a zero
/// denominator is 0.0.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub labels: Vec<LabelScores>,
    pub accuracy: f64,
    pub macro_avg: AveragedScores,
    pub weighted_avg: AveragedScores,
}

#[derive(Default)]
struct Tally {
    true_positives: usize,
    predicted: usize,
    support: usize,
}

impl ClassificationReport {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        let mut labels = BTreeSet::new();
        let (mut correct, mut total) = (0, 0);

        for (expected, predicted) in pairs {
            labels.insert(expected);
            labels.insert(predicted);
            total += 1;
            tallies.entry(expected).or_default().support += 1;
            tallies.entry(predicted).or_default().predicted += 1;
            if expected == predicted {
                correct += 1;
                tallies.entry(expected).or_default().true_positives += 1;
            }
        }

        let labels: Vec<LabelScores> = labels
            .into_iter()
            .map(|label| {
                let tally = &tallies[label];
                let precision = ratio(tally.true_positives, tally.predicted);
                let recall = ratio(tally.true_positives, tally.support);
                LabelScores {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: tally.support,
                }
            })
            .collect();

        let macro_avg = average(&labels, |_| 1.0);
        let weighted_avg = average(&labels, |scores| scores.support as f64);

        Self {
            labels,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn scores(&self, label: &str) -> Option<&LabelScores> {
        self.labels.iter().find(|scores| scores.label == label)
    }

    pub fn support(&self) -> usize {
        self.weighted_avg.support
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn average(labels: &[LabelScores], weight: impl Fn(&LabelScores) -> f64) -> AveragedScores {
    let support: usize = labels.iter().map(|scores| scores.support).sum();
    let total_weight: f64 = labels.iter().map(&weight).sum();
    if total_weight == 0.0 {
        return AveragedScores {
            support,
            ..AveragedScores::default()
        };
    }
    let weighted = |value: fn(&LabelScores) -> f64| {
        labels.iter().map(|s| value(s) * weight(s)).sum::<f64>() / total_weight
    };
    AveragedScores {
        precision: weighted(|s| s.precision),
        recall: weighted(|s| s.recall),
        f1: weighted(|s| s.f1),
        support,
    }
}

const ACCURACY_ROW: &str = "accuracy";
const MACRO_ROW: &str = "macro avg";
const WEIGHTED_ROW: &str = "weighted avg";

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|scores| scores.label.chars().count())
            .chain([WEIGHTED_ROW.len()])
            .max()
            .unwrap_or(WEIGHTED_ROW.len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for scores in &self.labels {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                scores.label, scores.precision, scores.recall, scores.f1, scores.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            ACCURACY_ROW,
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        for (name, avg) in [(MACRO_ROW, &self.macro_avg), (WEIGHTED_ROW, &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report(expected: &[&'static str], predicted: &[&'static str]) -> ClassificationReport {
        ClassificationReport::new(expected.iter().copied().zip(predicted.iter().copied()))
    }

    #[test]
    fn test_per_label_scores() {
        let report = report(&["A", "A", "B"], &["A", "B", "B"]);

        let a = report.scores("A").unwrap();
        assert_relative_eq!(a.precision, 1.0);
        assert_relative_eq!(a.recall, 0.5);
        assert_relative_eq!(a.f1, 2.0 / 3.0);
        assert_eq!(a.support, 2);

        let b = report.scores("B").unwrap();
        assert_relative_eq!(b.precision, 0.5);
        assert_relative_eq!(b.recall, 1.0);
        assert_eq!(b.support, 1);

        assert_relative_eq!(report.accuracy, 2.0 / 3.0);
    }

    #[test]
    fn test_macro_and_weighted_averages() {
        let report = report(&["A", "A", "B"], &["A", "B", "B"]);

        assert_relative_eq!(report.macro_avg.precision, 0.75);
        assert_relative_eq!(report.macro_avg.recall, 0.75);
        assert_relative_eq!(report.weighted_avg.precision, 2.5 / 3.0);
        assert_relative_eq!(report.weighted_avg.recall, 2.0 / 3.0);
        assert_eq!(report.weighted_avg.support, 3);
    }

    #[test]
    fn test_labels_are_sorted_union() {
        let report = report(&["Weather", "Book"], &["None", "Book"]);
        let labels: Vec<&str> = report.labels.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Book", "None", "Weather"]);
        assert_eq!(report.scores("None").unwrap().support, 0);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let report = report(&["A"], &["B"]);
        let a = report.scores("A").unwrap();
        let b = report.scores("B").unwrap();
        assert_relative_eq!(a.precision, 0.0);
        assert_relative_eq!(b.recall, 0.0);
        assert_relative_eq!(b.f1, 0.0);
        assert_relative_eq!(report.accuracy, 0.0);
    }

    #[test]
    fn test_empty_report() {
        let report = ClassificationReport::new(std::iter::empty());
        assert!(report.labels.is_empty());
        assert_relative_eq!(report.accuracy, 0.0);
        assert_relative_eq!(report.macro_avg.f1, 0.0);
    }

    #[test]
    fn test_display_table() {
        let text = report(&["A", "A", "B"], &["A", "B", "B"]).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "             precision    recall  f1-score   support"
        );
        assert_eq!(
            lines[2],
            "           A      1.00      0.50      0.67         2"
        );
        assert_eq!(
            lines[5],
            "    accuracy                          0.67         3"
        );
        assert_eq!(
            lines[7],
            "weighted avg      0.83      0.67      0.67         3"
        );
    }
}
