use std::{env, fs::File, io::{BufRead, BufReader}, path::Path, process};
use ppmi_model::artifacts::{self, SIMS_FILE};
use ppmi_model::{PpmiError, Result, Similarities};


// nearest neighbours from a finished run: for every word in the input file
// (one per line) print its k most similar words.
// treated as a separate binary so it can run without redoing the model
// example: ... query Output/ Input/words.txt 10

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {

    if args.len() < 3 || args.len() > 4 {
        return Err(PpmiError::Config("arguments should be an output dir, a word file and optionally k".into()));
    }
    let k = match args.get(3) {
        Some(k) => k.parse::<usize>().map_err(|_| PpmiError::Config(format!("k should be a positive integer, got {}", k)))?,
        None => 10
    };

    let sims: Similarities = artifacts::read_input(&Path::new(&args[1]).join(SIMS_FILE))?;
    log::info!("loaded {} similarities over {} words", sims.len(), sims.vocab().len());

    let f = File::open(&args[2]).map_err(|e| PpmiError::input(&args[2], e))?;
    for line in BufReader::new(f).lines() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        run_similarity(token, k, &sims);
    }
    Ok(())
}

fn run_similarity(token: &str, k: usize, sims: &Similarities) {

    println!("searching {} most similar words to {}", k, token);
    let neighbours = sims.most_similar(token, k);
    if neighbours.is_empty() {
        println!("'{}' has no ppmi vector in this model", token);
    }
    for (i, (similar_token, score)) in neighbours.iter().enumerate() {
        println!("{} : {} ? {} = {}", i, token, similar_token, score);
    }
    println!();
}
