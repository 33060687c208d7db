// imports
use crate::config::Hyperparams;
use crate::error::{PpmiError, Result};
use crate::progress::{Progress, Stage};
use crate::vocab::Vocabulary;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;


// documents per parallel shard; fixed so the summation order, and with it
// every float in the table, does not depend on the number of threads
const SHARD_DOCS: usize = 256;

/// Accumulated (word, context) weights over one vocabulary. Keys are
/// vocabulary ids; the table is not symmetric, (w, c) and (c, w) are
/// separate entries.
#[derive(Clone, Debug, PartialEq)]
pub struct CoocTable {
    vocab: Arc<Vocabulary>,
    counts: BTreeMap<(usize, usize), f64>,
}

impl CoocTable {

    pub fn new(vocab: Arc<Vocabulary>) -> CoocTable {
        Self { vocab, counts: BTreeMap::new() }
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    pub fn add(&mut self, word: usize, context: usize, weight: f64) {
        let val = self.counts.entry((word, context)).or_insert(0.0);
        *val += weight;
    }

    /// Adds every entry of `other` into `self`. Merging is associative and
    /// commutative, so shards can be counted independently.
    pub fn merge(&mut self, other: CoocTable) -> Result<()> {

        if !Arc::ptr_eq(&self.vocab, &other.vocab) && self.vocab != other.vocab {
            return Err(PpmiError::Config("cannot merge count tables built over different vocabularies".into()));
        }
        for ((w, c), v) in other.counts {
            self.add(w, c, v);
        }
        Ok(())
    }

    pub fn get(&self, word: &str, context: &str) -> Option<f64> {
        let key = (self.vocab.id(word)?, self.vocab.id(context)?);
        self.counts.get(&key).copied()
    }

    /// Entries as (word id, context id, weight), ordered by ids.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.counts.iter().map(|(&(w, c), &v)| (w, c, v))
    }

    pub fn iter_words(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.iter().map(|(w, c, v)| (self.vocab.word(w), self.vocab.word(c), v))
    }

    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}


pub struct Counts {}

impl Counts {

    /// Per-document generator for the variable window. Depends only on the run
    /// seed and the document's line index, never on how documents are sharded.
    pub fn document_rng(seed: u64, doc_index: usize) -> StdRng {
        let mixed = (doc_index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(seed ^ mixed)
    }

    /// Counts one whitespace-tokenized document into `table`. Documents of
    /// 2L+1 tokens or fewer are skipped. Returns the number of center tokens
    /// found in the vocabulary.
    pub fn count_document(tokens: &[&str],
        hyper: &Hyperparams,
        rng: &mut StdRng,
        table: &mut CoocTable) -> Result<usize> {

        hyper.validate_window()?;
        let l = hyper.window_size;
        if tokens.len() <= 2 * l + 1 {
            return Ok(0)
        }

        let vocab = Arc::clone(&table.vocab);
        let mut centers = 0;
        for (i, tok) in tokens.iter().enumerate() {

            let token_i = match vocab.id(tok) {
                Some(token_i) => token_i,
                None => continue
            };
            centers += 1;

            let context = hyper.weighting.context(tokens, i, l, rng);
            for (c, weight) in context {
                // contexts are filtered by the same vocabulary as centers
                if let Some(context_j) = vocab.id(c) {
                    table.add(token_i, context_j, weight);
                }
            }
        }
        Ok(centers)
    }

    /// Counts a shard of (line index, text) documents into a fresh table.
    /// Shards counted separately and merged in order give the same table as
    /// one `run` over all documents.
    pub fn count_shard(docs: &[(usize, String)], vocab: &Arc<Vocabulary>, hyper: &Hyperparams) -> Result<CoocTable> {

        hyper.validate_window()?;
        let mut table = CoocTable::new(Arc::clone(vocab));
        for (doc_index, line) in docs {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let mut rng = Counts::document_rng(hyper.seed, *doc_index);
            Counts::count_document(&tokens, hyper, &mut rng, &mut table)?;
        }
        Ok(table)
    }

    fn count_batch(batch: &[(usize, String)], vocab: &Arc<Vocabulary>, hyper: &Hyperparams, table: &mut CoocTable) -> Result<()> {

        let partials = batch
            .par_chunks(SHARD_DOCS)
            .map(|shard| Counts::count_shard(shard, vocab, hyper))
            .collect::<Result<Vec<CoocTable>>>()?;

        // merge in shard order
        for partial in partials {
            table.merge(partial)?;
        }
        Ok(())
    }

    /// Streams a corpus, one document per line, and counts (w, c) pairs over
    /// `vocab`. Lines are buffered `batch_docs` at a time and each batch is
    /// counted in parallel on the current rayon pool.
    pub fn run_reader<R: BufRead>(reader: R,
        source: &Path,
        vocab: Arc<Vocabulary>,
        hyper: &Hyperparams,
        batch_docs: usize,
        progress: &dyn Progress) -> Result<CoocTable> {

        hyper.validate_window()?;
        if vocab.is_empty() {
            return Err(PpmiError::Config("vocabulary is empty".into()));
        }
        let batch_docs = batch_docs.max(1);

        progress.stage_started(Stage::Counting);
        let mut table = CoocTable::new(Arc::clone(&vocab));
        let mut batch: Vec<(usize, String)> = Vec::with_capacity(batch_docs);
        let mut n_docs = 0;
        let mut n_skipped = 0;

        for (doc_index, raw) in reader.split(b'\n').enumerate() {

            let raw = raw.map_err(|e| PpmiError::input(source, e))?;
            n_docs += 1;

            match String::from_utf8(raw) {
                Ok(line) if line.trim().is_empty() => {
                    n_skipped += 1;
                    progress.line_skipped(doc_index + 1, "empty line");
                },
                Ok(line) => batch.push((doc_index, line)),
                Err(_) => {
                    n_skipped += 1;
                    progress.line_skipped(doc_index + 1, "line is not valid utf-8");
                }
            }

            if n_docs % batch_docs == 0 {
                Counts::count_batch(&batch, &vocab, hyper, &mut table)?;
                batch.clear();
                progress.documents_counted(n_docs);
            }
        }

        if n_docs % batch_docs != 0 {
            Counts::count_batch(&batch, &vocab, hyper, &mut table)?;
            progress.documents_counted(n_docs);
        }

        progress.counting_finished(n_docs, n_skipped, table.len());
        Ok(table)
    }

    /// Opens `corpus_file` and counts it. A missing or unreadable corpus fails
    /// before any counting starts.
    pub fn run(corpus_file: &Path,
        vocab: Arc<Vocabulary>,
        hyper: &Hyperparams,
        batch_docs: usize,
        progress: &dyn Progress) -> Result<CoocTable> {

        let f = File::open(corpus_file).map_err(|e| PpmiError::input(corpus_file, e))?;
        Counts::run_reader(BufReader::new(f), corpus_file, vocab, hyper, batch_docs, progress)
    }
}
