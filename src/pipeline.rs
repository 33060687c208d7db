// imports
use crate::artifacts::{self, RunMetadata, COUNTS_FILE, PPMI_FILE, SIMS_FILE};
use crate::config::{Config, JsonTypes};
use crate::cooccurrence::{CoocTable, Counts};
use crate::error::{PpmiError, Result};
use crate::ppmi::{Ppmi, PpmiSpace};
use crate::progress::{LogProgress, Progress};
use crate::similarity::{Similarities, Similarity};
use crate::vocab::Vocabulary;

use std::env;
use std::sync::Arc;
use std::time::Instant;
use rayon::ThreadPoolBuilder;

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 4 steps -
    // -> configuration of arguments
    // -> (w,c) pair counting
    // -> ppmi vectors
    // -> pairwise similarities
    // every step saves its artifact, so a later run can resume from it

    pub fn run() -> Result<Similarities> {

        log::info!("entering program...");
        let args: Vec<String> = env::args().collect();

        log::info!("building parameters...");
        let params = Config::new(&args)?.get_params();
        log::info!("{}", params);

        Pipeline::run_with(&params, &LogProgress)
    }

    pub fn run_with(params: &JsonTypes, progress: &dyn Progress) -> Result<Similarities> {

        params.hyper.validate()?;
        let pool = ThreadPoolBuilder::new().num_threads(params.num_threads).build()?;
        pool.install(|| Pipeline::stages(params, progress))
    }

    fn stages(params: &JsonTypes, progress: &dyn Progress) -> Result<Similarities> {

        let output_dir = params.output_dir.as_path();

        let mut metadata = RunMetadata::new(&params.hyper);

        // counts and ppmi are either computed and saved, or loaded from an earlier run
        let ppmi = if params.saved_ppmi {
            log::info!("loading saved ppmi vectors...");
            metadata = metadata.resumed_from(PPMI_FILE);
            artifacts::read_input::<PpmiSpace>(&output_dir.join(PPMI_FILE))?
        } else {
            let counts = if params.saved_counts {
                log::info!("loading saved (w,c) counts...");
                metadata = metadata.resumed_from(COUNTS_FILE);
                artifacts::read_input::<CoocTable>(&output_dir.join(COUNTS_FILE))?
            } else {
                let counts = Pipeline::count(params, progress)?;
                artifacts::save_output(output_dir, COUNTS_FILE, &counts)?;
                counts
            };

            let timer = Instant::now();
            let ppmi = Ppmi::run(&counts, &params.hyper, progress)?;
            artifacts::save_output(output_dir, PPMI_FILE, &ppmi)?;
            log::info!("ppmi vectors for {} words, took {} seconds ...", ppmi.len(), timer.elapsed().as_secs());
            ppmi
        };

        let timer = Instant::now();
        let sims = Similarity::run(&ppmi, progress)?;
        artifacts::save_output(output_dir, SIMS_FILE, &sims)?;
        if params.write_csv {
            artifacts::save_csv(&sims, output_dir, SIMS_FILE)?;
        }
        artifacts::save_metadata(&metadata, output_dir)?;
        log::info!("{} pairwise similarities, took {} seconds ...", sims.len(), timer.elapsed().as_secs());

        Ok(sims)
    }

    fn count(params: &JsonTypes, progress: &dyn Progress) -> Result<CoocTable> {

        // both are required unless resuming
        if params.vocab_files.is_empty() {
            return Err(PpmiError::Config("vocab_file is required to count pairs".into()));
        }
        let corpus_file = params.corpus_file.as_ref()
            .ok_or_else(|| PpmiError::Config("corpus_file is required to count pairs".into()))?;

        let mut vocab = Vocabulary::read_files(&params.vocab_files)?;
        if params.lowercase {
            vocab = vocab.lowercase();
        }
        if vocab.is_empty() {
            return Err(PpmiError::Config(format!("vocabulary {:?} is empty", params.vocab_files)));
        }
        log::info!("using {} vocabulary words", vocab.len());

        let timer = Instant::now();
        let counts = Counts::run(corpus_file, Arc::new(vocab), &params.hyper, params.batch_docs, progress)?;
        log::info!("finished counting {} (w,c) pairs, took {} seconds ...", counts.len(), timer.elapsed().as_secs());
        Ok(counts)
    }
}
