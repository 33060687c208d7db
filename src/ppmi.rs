use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Hyperparams;
use crate::cooccurrence::CoocTable;
use crate::error::{PpmiError, Result};
use crate::progress::{Progress, Stage};
use crate::vocab::Vocabulary;

/// Sparse PPMI vectors: word -> context -> score, every score strictly
/// positive. Words without any positive score are absent.
#[derive(Clone, Debug, PartialEq)]
pub struct PpmiSpace {
    vocab: Arc<Vocabulary>,
    vectors: BTreeMap<usize, BTreeMap<usize, f64>>,
}

impl PpmiSpace {

    pub fn new(vocab: Arc<Vocabulary>) -> PpmiSpace {
        Self { vocab, vectors: BTreeMap::new() }
    }

    /// Scores that are not strictly positive are dropped.
    pub fn insert(&mut self, word: usize, context: usize, score: f64) {
        if score > 0.0 {
            self.vectors.entry(word).or_default().insert(context, score);
        }
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    pub fn vector(&self, word: &str) -> Option<&BTreeMap<usize, f64>> {
        self.vectors.get(&self.vocab.id(word)?)
    }

    pub fn score(&self, word: &str, context: &str) -> Option<f64> {
        self.vector(word)?.get(&self.vocab.id(context)?).copied()
    }

    /// Vectors in word id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<usize, f64>)> + '_ {
        self.vectors.iter().map(|(w, v)| (*w, v))
    }

    /// Number of words with a vector.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Number of (word, context) scores.
    pub fn entries(&self) -> usize {
        self.vectors.values().map(BTreeMap::len).sum()
    }
}

/// Marginal distributions of a count table, indexed by vocabulary id.
#[derive(Clone, Debug)]
pub struct Marginals {
    /// Pw(w): raw row mass over total mass.
    pub words: Vec<f64>,
    /// Pc(c): sum of count^alpha over column c, normalized over all pairs.
    pub contexts: Vec<f64>,
    /// total count mass of the table.
    pub total: f64,
}

impl Marginals {

    pub fn from_counts(counts: &CoocTable, alpha: f64) -> Marginals {

        let n = counts.vocab().len();
        let mut words = vec![0.0; n];
        let mut contexts = vec![0.0; n];
        for (w, c, v) in counts.iter() {
            words[w] += v;
            contexts[c] += v.powf(alpha);
        }

        let total: f64 = words.iter().sum();
        let smoothed_total: f64 = contexts.iter().sum();
        if total > 0.0 {
            words.iter_mut().for_each(|p| *p /= total);
        }
        if smoothed_total > 0.0 {
            contexts.iter_mut().for_each(|p| *p /= smoothed_total);
        }

        Self { words, contexts, total }
    }
}

pub struct Ppmi {}

impl Ppmi {

    /// Shifted PPMI of every observed pair:
    ///
    ///   max(ln(P(w,c) / (Pw(w) * Pw(c))) - ln k, 0)
    ///
    /// The context term is the unsmoothed word marginal of the context word;
    /// with `context_smoothing` set it is the alpha-smoothed context marginal instead.
    pub fn run(counts: &CoocTable, hyper: &Hyperparams, progress: &dyn Progress) -> Result<PpmiSpace> {

        hyper.validate_ppmi()?;
        progress.stage_started(Stage::Ppmi);

        let marginals = Marginals::from_counts(counts, hyper.alpha);
        if !(marginals.total > 0.0) {
            return Err(PpmiError::Degenerate {
                stage: Stage::Ppmi,
                reason: format!("total count mass is {}, nothing to normalize", marginals.total)
            });
        }

        let vocab = counts.vocab();
        let ln_k = hyper.shift.ln();
        let mut space = PpmiSpace::new(Arc::clone(vocab));

        for (w, c, v) in counts.iter() {

            let p_wc = v / marginals.total;
            let p_c = if hyper.context_smoothing { marginals.contexts[c] } else { marginals.words[c] };
            let denom = marginals.words[w] * p_c;

            if !(denom > 0.0) {
                // the context word never occurs as a center, its marginal is zero
                progress.pair_skipped(Stage::Ppmi, vocab.word(w), vocab.word(c), "context has zero marginal mass");
                continue;
            }

            let score = ((p_wc / denom).ln() - ln_k).max(0.0);
            space.insert(w, c, score);
        }

        progress.stage_finished(Stage::Ppmi, space.entries());
        Ok(space)
    }
}
