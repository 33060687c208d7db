use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::ppmi::PpmiSpace;
use crate::progress::{Progress, Stage};
use crate::vocab::Vocabulary;

/// Cosine similarities over unordered word pairs, keyed (lower id, higher id).
#[derive(Clone, Debug, PartialEq)]
pub struct Similarities {
    vocab: Arc<Vocabulary>,
    pairs: BTreeMap<(usize, usize), f64>,
}

impl Similarities {

    pub fn new(vocab: Arc<Vocabulary>) -> Similarities {
        Self { vocab, pairs: BTreeMap::new() }
    }

    pub fn insert(&mut self, first: usize, second: usize, similarity: f64) {
        let key = if first <= second { (first, second) } else { (second, first) };
        self.pairs.insert(key, similarity);
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Order of the two words does not matter.
    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        let (i, j) = (self.vocab.id(first)?, self.vocab.id(second)?);
        let key = if i <= j { (i, j) } else { (j, i) };
        self.pairs.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.pairs.iter().map(|(&(i, j), &s)| (i, j, s))
    }

    pub fn iter_words(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.iter().map(|(i, j, s)| (self.vocab.word(i), self.vocab.word(j), s))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The `k` words most similar to `word`, best first. Ties are broken by word.
    pub fn most_similar(&self, word: &str, k: usize) -> Vec<(&str, f64)> {

        let id = match self.vocab.id(word) {
            Some(id) => id,
            None => return Vec::new()
        };

        let mut sim_tokens: Vec<(&str, f64)> = self
            .iter()
            .filter_map(|(i, j, s)| {
                if i == id {
                    Some((self.vocab.word(j), s))
                } else if j == id {
                    Some((self.vocab.word(i), s))
                } else {
                    None
                }
            })
            .collect();

        // sort by most similar in descending order
        sim_tokens.sort_by(|(t, s), (u, r)| r.total_cmp(s).then_with(|| t.cmp(u)));
        sim_tokens.truncate(k);
        sim_tokens
    }
}

/// L2 norm of a sparse vector.
pub fn norm(vector: &BTreeMap<usize, f64>) -> f64 {
    vector.values().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dot product over the contexts both vectors share.
pub fn dot(first: &BTreeMap<usize, f64>, second: &BTreeMap<usize, f64>) -> f64 {
    let (small, large) = if first.len() <= second.len() { (first, second) } else { (second, first) };
    small
        .iter()
        .filter_map(|(c, x)| large.get(c).map(|y| x * y))
        .sum()
}

/// Cosine of two sparse vectors, `None` when either has zero norm.
pub fn cosine(first: &BTreeMap<usize, f64>, second: &BTreeMap<usize, f64>) -> Option<f64> {
    let den = norm(first) * norm(second);
    if !(den > 0.0) {
        return None
    }
    Some((dot(first, second) / den).clamp(-1.0, 1.0))
}

pub struct Similarity {}

impl Similarity {

    /// All-pairs cosine similarity of the PPMI vectors. Each pair of distinct
    /// words in the space is scored once; a pair involving a zero-norm vector
    /// is left out and reported through `progress`. Rows run in parallel on
    /// the current rayon pool.
    pub fn run(space: &PpmiSpace, progress: &dyn Progress) -> Result<Similarities> {

        progress.stage_started(Stage::Similarity);

        let vectors: Vec<(usize, &BTreeMap<usize, f64>, f64)> = space
            .iter()
            .map(|(w, v)| (w, v, norm(v)))
            .collect();

        let rows: Vec<Vec<(usize, usize, Option<f64>)>> = (0..vectors.len())
            .into_par_iter()
            .map(|i| {
                let (w_i, v_i, n_i) = vectors[i];
                vectors[i + 1..]
                    .iter()
                    .map(|&(w_j, v_j, n_j)| {
                        let den = n_i * n_j;
                        let sim = if den > 0.0 { Some((dot(v_i, v_j) / den).clamp(-1.0, 1.0)) } else { None };
                        (w_i, w_j, sim)
                    })
                    .collect()
            })
            .collect();

        let vocab = space.vocab();
        let mut sims = Similarities::new(Arc::clone(vocab));
        for (w_i, w_j, sim) in rows.into_iter().flatten() {
            match sim {
                Some(sim) => sims.insert(w_i, w_j, sim),
                None => progress.pair_skipped(Stage::Similarity, vocab.word(w_i), vocab.word(w_j), "zero-norm vector, similarity undefined")
            }
        }

        progress.stage_finished(Stage::Similarity, sims.len());
        Ok(sims)
    }
}
