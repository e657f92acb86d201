use std::thread;

use crate::evaluation::domain::utterance_pair::UtterancePair;
use crate::evaluation::pair_executor::{PairExecutor, PairOutcome, SequentialPairExecutor};
use crate::evaluation::transcription_evaluator::evaluate_pair;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fans pair alignments out to a fixed pool of worker threads.
///
/// Layout: `feeder → workers → collector`. Outcomes are slotted back by
/// input index, so the result is identical to [`SequentialPairExecutor`].
pub struct ThreadedPairExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedPairExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedPairExecutor {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}

impl PairExecutor for ThreadedPairExecutor {
    fn evaluate(&self, pairs: &[&UtterancePair]) -> Vec<PairOutcome> {
        if self.workers == 1 || pairs.len() < 2 {
            return SequentialPairExecutor.evaluate(pairs);
        }

        let (job_tx, job_rx) =
            crossbeam_channel::bounded::<(usize, &UtterancePair)>(self.channel_capacity);
        // Unbounded so workers never block while the feeder is still sending.
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, PairOutcome)>();

        thread::scope(|scope| {
            for _ in 0..self.workers.min(pairs.len()) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, pair) in job_rx {
                        if result_tx.send((index, evaluate_pair(pair))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            for job in pairs.iter().copied().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);

            let mut slots: Vec<Option<PairOutcome>> = (0..pairs.len()).map(|_| None).collect();
            for (index, outcome) in result_rx {
                slots[index] = Some(outcome);
            }
            slots.into_iter().flatten().collect()
        })
    }
}
