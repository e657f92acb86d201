use serde::Serialize;

/// A single step transforming the reference token sequence into the
/// recognized one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Match { token: String },
    Substitution { reference: String, recognized: String },
    /// Token present only in the recognized text.
    Insertion { token: String },
    /// Token present only in the reference text.
    Deletion { token: String },
}

impl EditOp {
    pub fn is_error(&self) -> bool {
        !matches!(self, EditOp::Match { .. })
    }

    pub fn reference_token(&self) -> Option<&str> {
        match self {
            EditOp::Match { token } | EditOp::Deletion { token } => Some(token),
            EditOp::Substitution { reference, .. } => Some(reference),
            EditOp::Insertion { .. } => None,
        }
    }

    pub fn recognized_token(&self) -> Option<&str> {
        match self {
            EditOp::Match { token } | EditOp::Insertion { token } => Some(token),
            EditOp::Substitution { recognized, .. } => Some(recognized),
            EditOp::Deletion { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EditCounts {
    pub matches: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl EditCounts {
    pub fn errors(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }

    /// Number of reference tokens covered by these operations.
    pub fn reference_len(&self) -> usize {
        self.matches + self.substitutions + self.deletions
    }
}

/// Cost of a partial alignment, ordered lexicographically: fewest edits
/// first, then fewest insertions/deletions so that a substitution wins over
/// an equivalent insertion+deletion pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Cost {
    edits: usize,
    indels: usize,
}

impl Cost {
    fn gap(len: usize) -> Self {
        Self {
            edits: len,
            indels: len,
        }
    }

    fn plus(self, edits: usize, indels: usize) -> Self {
        Self {
            edits: self.edits + edits,
            indels: self.indels + indels,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Diagonal,
    Delete,
    Insert,
}

/// Minimum-edit-distance alignment between two token sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alignment {
    ops: Vec<EditOp>,
}

impl Alignment {
    /// Aligns `reference` against `recognized` with unit costs.
    ///
    /// Among minimum-cost alignments, the one with fewer insertions and
    /// deletions is chosen. Remaining ties are resolved reading left to
    /// right, preferring the diagonal step (match or substitution), then
    /// deletion, then insertion.
    pub fn between(reference: &[&str], recognized: &[&str]) -> Self {
        let (n, m) = (reference.len(), recognized.len());
        let cols = m + 1;
        // cost[i * cols + j] aligns reference[i..] with recognized[j..].
        let mut cost = vec![Cost::default(); (n + 1) * cols];
        let mut steps = vec![Step::Diagonal; (n + 1) * cols];

        for i in 0..n {
            cost[i * cols + m] = Cost::gap(n - i);
            steps[i * cols + m] = Step::Delete;
        }
        for j in 0..m {
            cost[n * cols + j] = Cost::gap(m - j);
            steps[n * cols + j] = Step::Insert;
        }

        for i in (0..n).rev() {
            for j in (0..m).rev() {
                let mismatch = usize::from(reference[i] != recognized[j]);
                let mut best = cost[(i + 1) * cols + (j + 1)].plus(mismatch, 0);
                let mut step = Step::Diagonal;

                let delete = cost[(i + 1) * cols + j].plus(1, 1);
                if delete < best {
                    best = delete;
                    step = Step::Delete;
                }
                let insert = cost[i * cols + (j + 1)].plus(1, 1);
                if insert < best {
                    best = insert;
                    step = Step::Insert;
                }

                cost[i * cols + j] = best;
                steps[i * cols + j] = step;
            }
        }

        let mut ops = Vec::with_capacity(n.max(m));
        let (mut i, mut j) = (0, 0);
        while i < n || j < m {
            match steps[i * cols + j] {
                Step::Diagonal => {
                    let (r, h) = (reference[i], recognized[j]);
                    ops.push(if r == h {
                        EditOp::Match {
                            token: r.to_string(),
                        }
                    } else {
                        EditOp::Substitution {
                            reference: r.to_string(),
                            recognized: h.to_string(),
                        }
                    });
                    i += 1;
                    j += 1;
                }
                Step::Delete => {
                    ops.push(EditOp::Deletion {
                        token: reference[i].to_string(),
                    });
                    i += 1;
                }
                Step::Insert => {
                    ops.push(EditOp::Insertion {
                        token: recognized[j].to_string(),
                    });
                    j += 1;
                }
            }
        }

        Self { ops }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn counts(&self) -> EditCounts {
        let mut counts = EditCounts::default();
        for op in &self.ops {
            match op {
                EditOp::Match { .. } => counts.matches += 1,
                EditOp::Substitution { .. } => counts.substitutions += 1,
                EditOp::Insertion { .. } => counts.insertions += 1,
                EditOp::Deletion { .. } => counts.deletions += 1,
            }
        }
        counts
    }

    pub fn reference_tokens(&self) -> Vec<&str> {
        self.ops.iter().filter_map(EditOp::reference_token).collect()
    }

    pub fn recognized_tokens(&self) -> Vec<&str> {
        self.ops.iter().filter_map(EditOp::recognized_token).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.ops.iter().any(EditOp::is_error)
    }
}
