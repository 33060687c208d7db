// progress observer handed to every stage of the pipeline.
//
// stages never talk to a logger directly, they report to whatever `Progress`
// the caller passes in. `LogProgress` forwards to the `log` facade and
// `Silent` drops everything.

use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Counting,
    Ppmi,
    Similarity,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Counting => "counting",
            Stage::Ppmi => "ppmi",
            Stage::Similarity => "similarity",
        };
        f.write_str(name)
    }
}

pub trait Progress: Sync {
    fn stage_started(&self, _stage: Stage) {}

    /// Called after each counted batch with the running number of documents read.
    fn documents_counted(&self, _n_docs: usize) {}

    /// A corpus line was dropped; `line` is 1-based.
    fn line_skipped(&self, _line: usize, _reason: &str) {}

    /// A (word, other) pair was dropped by a degenerate-case policy.
    fn pair_skipped(&self, _stage: Stage, _word: &str, _other: &str, _reason: &str) {}

    fn stage_finished(&self, _stage: Stage, _entries: usize) {}

    /// Final counting summary: lines read, lines skipped and distinct (w, c) entries.
    fn counting_finished(&self, _n_docs: usize, _n_skipped: usize, entries: usize) {
        self.stage_finished(Stage::Counting, entries);
    }
}

/// Reports through `log`.
pub struct LogProgress;

impl Progress for LogProgress {
    fn stage_started(&self, stage: Stage) {
        log::info!("starting {} stage...", stage);
    }

    fn documents_counted(&self, n_docs: usize) {
        log::info!("counted (w,c) pairs in {} documents", n_docs);
    }

    fn line_skipped(&self, line: usize, reason: &str) {
        log::warn!("skipping corpus line {}: {}", line, reason);
    }

    fn pair_skipped(&self, stage: Stage, word: &str, other: &str, reason: &str) {
        log::warn!("{} stage skipped ({}, {}): {}", stage, word, other, reason);
    }

    fn stage_finished(&self, stage: Stage, entries: usize) {
        log::info!("{} stage complete, {} entries", stage, entries);
    }

    fn counting_finished(&self, n_docs: usize, n_skipped: usize, entries: usize) {
        log::info!("counting stage complete, {} documents read, {} skipped, {} (w,c) entries", n_docs, n_skipped, entries);
    }
}

pub struct Silent;

impl Progress for Silent {}


#[cfg(test)]
mod tests {

    use std::sync::Mutex;
    use super::{Progress, Stage};

    #[derive(Default)]
    struct Finished(Mutex<Vec<(Stage, usize)>>);

    impl Progress for Finished {
        fn stage_finished(&self, stage: Stage, entries: usize) {
            self.0.lock().unwrap().push((stage, entries));
        }
    }

    #[test]
    fn counting_summary_defaults_to_stage_finished() {
        let finished = Finished::default();
        finished.counting_finished(12, 3, 40);
        assert_eq!(*finished.0.lock().unwrap(), vec![(Stage::Counting, 40)]);
    }
}
