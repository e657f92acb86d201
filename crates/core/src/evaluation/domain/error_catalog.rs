use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, Serializer};

use super::alignment::{Alignment, EditOp};

pub const EMPTY_TOKEN: &str = "∅";

/// Identifies one kind of recognition error. A `None` side stands for `∅`:
/// `(Some, None)` is a deletion, `(None, Some)` an insertion.
///
/// Ordering is lexicographic on `(reference, recognized)` with `∅` first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorKey {
    pub reference: Option<String>,
    pub recognized: Option<String>,
}

impl ErrorKey {
    pub fn from_op(op: &EditOp) -> Option<Self> {
        if !op.is_error() {
            return None;
        }
        Some(Self {
            reference: op.reference_token().map(str::to_string),
            recognized: op.recognized_token().map(str::to_string),
        })
    }

    pub fn substitution(reference: &str, recognized: &str) -> Self {
        Self {
            reference: Some(reference.to_string()),
            recognized: Some(recognized.to_string()),
        }
    }

    pub fn deletion(token: &str) -> Self {
        Self {
            reference: Some(token.to_string()),
            recognized: None,
        }
    }

    pub fn insertion(token: &str) -> Self {
        Self {
            reference: None,
            recognized: Some(token.to_string()),
        }
    }

    pub fn reference_display(&self) -> &str {
        self.reference.as_deref().unwrap_or(EMPTY_TOKEN)
    }

    pub fn recognized_display(&self) -> &str {
        self.recognized.as_deref().unwrap_or(EMPTY_TOKEN)
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.reference_display(),
            self.recognized_display()
        )
    }
}

/// Occurrence counts of substitutions, insertions and deletions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorCatalog {
    counts: HashMap<ErrorKey, usize>,
}

impl ErrorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alignment(alignment: &Alignment) -> Self {
        let mut catalog = Self::new();
        catalog.record(alignment);
        catalog
    }

    pub fn record(&mut self, alignment: &Alignment) {
        for key in alignment.ops().iter().filter_map(ErrorKey::from_op) {
            *self.counts.entry(key).or_default() += 1;
        }
    }

    /// Adds every count of `other` into `self`.
    pub fn merge(&mut self, other: ErrorCatalog) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_default() += count;
        }
    }

    pub fn count(&self, key: &ErrorKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries seen at least `min_count` times, most frequent first, ties
    /// broken by key order.
    pub fn ranked(&self, min_count: usize) -> Vec<(&ErrorKey, usize)> {
        let mut entries: Vec<(&ErrorKey, usize)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count >= min_count)
            .map(|(key, count)| (key, *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[derive(serde::Serialize)]
struct CatalogEntry<'a> {
    reference: Option<&'a str>,
    recognized: Option<&'a str>,
    count: usize,
}

impl Serialize for ErrorCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ranked(1).into_iter().map(|(key, count)| CatalogEntry {
            reference: key.reference.as_deref(),
            recognized: key.recognized.as_deref(),
            count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignment(reference: &str, recognized: &str) -> Alignment {
        let r: Vec<&str> = reference.split_whitespace().collect();
        let h: Vec<&str> = recognized.split_whitespace().collect();
        Alignment::between(&r, &h)
    }

    #[test]
    fn test_matches_are_not_recorded() {
        let catalog = ErrorCatalog::from_alignment(&alignment("hello world", "hello world"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_records_each_error_kind() {
        let mut catalog = ErrorCatalog::new();
        catalog.record(&alignment("book a flight to paris", "book flight to rome now"));

        assert_eq!(catalog.count(&ErrorKey::deletion("a")), 1);
        assert_eq!(catalog.count(&ErrorKey::substitution("paris", "rome")), 1);
        assert_eq!(catalog.count(&ErrorKey::insertion("now")), 1);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut first = ErrorCatalog::from_alignment(&alignment("paris", "rome"));
        let second = ErrorCatalog::from_alignment(&alignment("to paris", "to rome"));
        first.merge(second);
        assert_eq!(first.count(&ErrorKey::substitution("paris", "rome")), 2);
    }

    #[test]
    fn test_ranked_orders_by_count_then_key() {
        let mut catalog = ErrorCatalog::new();
        catalog.record(&alignment("b", "x"));
        catalog.record(&alignment("a", "y"));
        catalog.record(&alignment("c", "z"));
        catalog.record(&alignment("c", "z"));
        catalog.record(&alignment("", "uh"));

        let ranked: Vec<String> = catalog
            .ranked(1)
            .into_iter()
            .map(|(key, count)| format!("{key}:{count}"))
            .collect();
        assert_eq!(
            ranked,
            vec!["c -> z:2", "∅ -> uh:1", "a -> y:1", "b -> x:1"]
        );
    }

    #[test]
    fn test_ranked_filters_by_min_count() {
        let mut catalog = ErrorCatalog::new();
        catalog.record(&alignment("one two", "won too"));
        catalog.record(&alignment("two", "too"));

        let ranked = catalog.ranked(2);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, &ErrorKey::substitution("two", "too"));
        assert_eq!(ranked[0].1, 2);
    }

    #[test]
    fn test_ranking_is_stable_across_runs() {
        let build = || {
            let mut catalog = ErrorCatalog::new();
            for (r, h) in [("a b c", "x y z"), ("d e", "e d"), ("f", "")] {
                catalog.record(&alignment(r, h));
            }
            catalog
                .ranked(1)
                .into_iter()
                .map(|(key, count)| (key.clone(), count))
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_serializes_ranked_entries() {
        let catalog = ErrorCatalog::from_alignment(&alignment("to paris", "rome"));
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "reference": "paris", "recognized": null, "count": 1 },
                { "reference": "to", "recognized": "rome", "count": 1 },
            ])
        );
    }
}
