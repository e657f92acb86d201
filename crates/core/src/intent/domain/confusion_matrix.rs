use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Counts of (expected, predicted) intent pairs. Rows are expected labels,
/// columns predicted labels, both in sorted order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let labels: Vec<String> = pairs
            .iter()
            .flat_map(|(expected, predicted)| [*expected, *predicted])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (expected, predicted) in pairs {
            if let (Some(row), Some(col)) = (index_of(&labels, expected), index_of(&labels, predicted)) {
                counts[row][col] += 1;
            }
        }
        Self { labels, counts }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, expected: &str, predicted: &str) -> usize {
        match (index_of(&self.labels, expected), index_of(&self.labels, predicted)) {
            (Some(row), Some(col)) => self.counts[row][col],
            _ => 0,
        }
    }
}

fn index_of(labels: &[String], label: &str) -> Option<usize> {
    labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .labels
            .iter()
            .enumerate()
            .map(|(col, label)| {
                let widest = self
                    .counts
                    .iter()
                    .map(|row| row[col].to_string().len())
                    .max()
                    .unwrap_or(1);
                label.chars().count().max(widest)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (label, width) in self.labels.iter().zip(&widths) {
            write!(f, "  {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:<label_width$}")?;
            for (count, width) in row.iter().zip(&widths) {
                write!(f, "  {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
