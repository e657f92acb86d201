use std::io::{self, Write};

use crate::evaluation::domain::alignment::{Alignment, EditOp};
use crate::evaluation::transcription_evaluator::Evaluation;

const GAP: char = '*';

/// Verbosity levels of [`print_report`].
pub const VERBOSITY_AGGREGATE: u8 = 0;
pub const VERBOSITY_PER_PAIR: u8 = 1;
pub const VERBOSITY_ALIGNED: u8 = 2;

/// Writes the human-readable evaluation report.
///
/// The aggregate block and the error ranking are always printed. Level 1
/// adds one metrics line per pair and level 2 adds the aligned rendering of
/// every pair that has errors. Catalog entries seen fewer than `min_count`
/// times are left out.
pub fn print_report<W: Write>(
    out: &mut W,
    evaluation: &Evaluation,
    verbosity: u8,
    min_count: usize,
) -> io::Result<()> {
    let aggregate = &evaluation.aggregate;
    writeln!(
        out,
        "Evaluated {} of {} utterance pairs, {} skipped",
        aggregate.evaluated,
        aggregate.evaluated + aggregate.skipped,
        aggregate.skipped
    )?;
    if !evaluation.skipped.is_empty() {
        writeln!(out, "Skipped pairs:")?;
        for skipped in &evaluation.skipped {
            writeln!(out, "  {}: {}", skipped.label, skipped.reason)?;
        }
    }
    writeln!(
        out,
        "Word error rate: {} ({} errors / {} reference words; S={} I={} D={})",
        percent(aggregate.word_error_rate),
        aggregate.errors(),
        aggregate.reference_len,
        aggregate.substitutions,
        aggregate.insertions,
        aggregate.deletions
    )?;

    if verbosity >= VERBOSITY_PER_PAIR {
        writeln!(out)?;
        writeln!(out, "Per-utterance results:")?;
        for pair in &evaluation.pairs {
            let metrics = &pair.metrics;
            writeln!(
                out,
                "  {}: WER {} (S={} I={} D={}, N={})",
                metrics.label,
                percent(metrics.word_error_rate),
                metrics.substitutions,
                metrics.insertions,
                metrics.deletions,
                metrics.reference_len
            )?;
            if verbosity >= VERBOSITY_ALIGNED && pair.alignment.has_errors() {
                let (reference, recognized) = render_alignment(&pair.alignment);
                writeln!(out, "    REF: {reference}")?;
                writeln!(out, "    REC: {recognized}")?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Most frequent errors (count >= {min_count}):")?;
    let ranked = evaluation.catalog.ranked(min_count);
    if ranked.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (key, count) in ranked {
        writeln!(out, "  {count:>4}  {key}")?;
    }
    Ok(())
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Renders both sides of an alignment in padded columns. Error tokens are
/// uppercased and gaps are drawn with `*`.
pub fn render_alignment(alignment: &Alignment) -> (String, String) {
    let mut reference = Vec::with_capacity(alignment.ops().len());
    let mut recognized = Vec::with_capacity(alignment.ops().len());

    for op in alignment.ops() {
        let (r, h) = match op {
            EditOp::Match { token } => (token.clone(), token.clone()),
            EditOp::Substitution {
                reference,
                recognized,
            } => (reference.to_uppercase(), recognized.to_uppercase()),
            EditOp::Deletion { token } => {
                let token = token.to_uppercase();
                let gap = gap(&token);
                (token, gap)
            }
            EditOp::Insertion { token } => {
                let token = token.to_uppercase();
                (gap(&token), token)
            }
        };
        let width = r.chars().count().max(h.chars().count());
        reference.push(format!("{r:<width$}"));
        recognized.push(format!("{h:<width$}"));
    }

    (
        reference.join(" ").trim_end().to_string(),
        recognized.join(" ").trim_end().to_string(),
    )
}

fn gap(token: &str) -> String {
    std::iter::repeat(GAP).take(token.chars().count()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::domain::utterance_pair::UtterancePair;
    use crate::evaluation::transcription_evaluator::TranscriptionEvaluator;

    fn evaluation() -> Evaluation {
        TranscriptionEvaluator::default()
            .compute_metrics(&[
                UtterancePair::new("0", "book a flight to paris", "book a flight to rome"),
                UtterancePair::new("1", "hello", "hello"),
                UtterancePair::new("1", "again", "again"),
            ])
            .unwrap()
    }

    fn render(evaluation: &Evaluation, verbosity: u8, min_count: usize) -> String {
        let mut out = Vec::new();
        print_report(&mut out, evaluation, verbosity, min_count).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn align(reference: &str, recognized: &str) -> Alignment {
        let r: Vec<&str> = reference.split_whitespace().collect();
        let h: Vec<&str> = recognized.split_whitespace().collect();
        Alignment::between(&r, &h)
    }

    #[test]
    fn test_aggregate_only_report() {
        let report = render(&evaluation(), VERBOSITY_AGGREGATE, 1);
        assert_eq!(
            report,
            "Evaluated 2 of 3 utterance pairs, 1 skipped\n\
             Skipped pairs:\n\
             \x20 1: label '1' is already used by another pair\n\
             Word error rate: 16.67% (1 errors / 6 reference words; S=1 I=0 D=0)\n\
             \n\
             Most frequent errors (count >= 1):\n\
             \x20    1  paris -> rome\n"
        );
    }

    #[test]
    fn test_per_pair_lines_without_alignment() {
        let report = render(&evaluation(), VERBOSITY_PER_PAIR, 1);
        assert!(report.contains("  0: WER 20.00% (S=1 I=0 D=0, N=5)\n"));
        assert!(report.contains("  1: WER 0.00% (S=0 I=0 D=0, N=1)\n"));
        assert!(!report.contains("REF:"));
    }

    #[test]
    fn test_aligned_rendering_only_for_pairs_with_errors() {
        let report = render(&evaluation(), VERBOSITY_ALIGNED, 1);
        assert!(report.contains("    REF: book a flight to PARIS\n"));
        assert!(report.contains("    REC: book a flight to ROME\n"));
        assert_eq!(report.matches("REF:").count(), 1);
    }

    #[test]
    fn test_min_count_hides_rare_errors() {
        let report = render(&evaluation(), VERBOSITY_AGGREGATE, 2);
        assert!(report.contains("Most frequent errors (count >= 2):\n  (none)\n"));
    }

    #[test]
    fn test_metrics_do_not_depend_on_verbosity() {
        let evaluation = evaluation();
        let quiet = render(&evaluation, VERBOSITY_AGGREGATE, 1);
        let verbose = render(&evaluation, VERBOSITY_ALIGNED, 1);
        let rate_line = |report: &str| {
            report
                .lines()
                .find(|line| line.starts_with("Word error rate"))
                .map(str::to_string)
        };
        assert_eq!(rate_line(&quiet), rate_line(&verbose));
    }

    #[test]
    fn test_render_alignment_pads_columns_and_marks_gaps() {
        let (reference, recognized) = render_alignment(&align("to paris", "to rome now"));
        assert_eq!(reference, "to PARIS ***");
        assert_eq!(recognized, "to ROME  NOW");
    }

    #[test]
    fn test_render_alignment_deletion() {
        let (reference, recognized) = render_alignment(&align("i want to fly", "i want fly"));
        assert_eq!(reference, "i want TO fly");
        assert_eq!(recognized, "i want ** fly");
    }
}
