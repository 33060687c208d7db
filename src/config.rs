use serde::Serialize;
use serde_json::Value;
use std::{fs, fmt::Display, path::PathBuf};

use crate::error::{PpmiError, Result};
use crate::window::Weighting;

/// Model hyperparameters shared by the counting and PPMI stages.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hyperparams {
    /// half-window radius L.
    pub window_size: usize,
    /// PMI shift k, scores are max(pmi - ln k, 0).
    pub shift: f64,
    /// context distribution smoothing exponent.
    pub alpha: f64,
    pub weighting: Weighting,
    /// use the alpha-smoothed context marginal in the PMI ratio instead of the word marginal.
    pub context_smoothing: bool,
    /// seeds the per-document generators of the variable window.
    pub seed: u64,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            window_size: 2,
            shift: 1.0,
            alpha: 0.75,
            weighting: Weighting::Unweighted,
            context_smoothing: false,
            seed: 0,
        }
    }
}

impl Hyperparams {

    pub fn validate_window(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PpmiError::Config("window_size (L) must be a positive integer, got 0".into()));
        }
        Ok(())
    }

    pub fn validate_ppmi(&self) -> Result<()> {
        if !(self.shift.is_finite() && self.shift > 0.0) {
            return Err(PpmiError::Config(format!("shift (k) must be positive, got {}", self.shift)));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(PpmiError::Config(format!("alpha must be in (0, 1], got {}", self.alpha)));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_window()?;
        self.validate_ppmi()
    }
}

impl Display for Hyperparams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model hyper-params:
        window_size: {},
        shift: {},
        alpha: {},
        weighting: {},
        context_smoothing: {},
        seed: {}",
        self.window_size, self.shift, self.alpha, self.weighting, self.context_smoothing, self.seed
        )
    }
}

/// Everything a run needs, as read from the JSON configuration file.
#[derive(Clone, Debug)]
pub struct JsonTypes {
    pub corpus_file: Option<PathBuf>,
    pub vocab_files: Vec<PathBuf>,
    pub lowercase: bool,
    pub output_dir: PathBuf,
    pub num_threads: usize,
    pub batch_docs: usize,
    pub saved_counts: bool,
    pub saved_ppmi: bool,
    pub write_csv: bool,
    pub hyper: Hyperparams,
}

impl Display for JsonTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using run params:
        corpus_file: {:?}
        vocab_files: {:?}
        lowercase: {}
        output_dir: {}
        num_threads: {}
        batch_docs: {}
        saved_counts: {}
        saved_ppmi: {}
        write_csv: {},
        Using {}",
        self.corpus_file, self.vocab_files, self.lowercase, self.output_dir.display(), self.num_threads,
        self.batch_docs, self.saved_counts, self.saved_ppmi, self.write_csv, self.hyper)
    }
}

pub struct Config {
    params: JsonTypes
}

impl Config {

    pub fn get_params(&self) -> JsonTypes {
        self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(PpmiError::Config("input should be a path to json file only".into()));
        }

        let raw = fs::read_to_string(&args[1]).map_err(|e| PpmiError::input(&args[1], e))?;
        let json: Value = serde_json::from_str(&raw)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        if !json.is_object() {
            return Err(PpmiError::Config("configuration must be a json object".into()));
        }

        let defaults = Hyperparams::default();

        let window_size = match json.get("window_size") {
            Some(v) => {
                let l = v.as_i64().ok_or_else(|| not_a("window_size", "an integer"))?;
                if l <= 0 {
                    return Err(PpmiError::Config(format!("window_size (L) must be a positive integer, got {}", l)));
                }
                l as usize
            },
            None => defaults.window_size
        };
        let weighting = match json.get("weighting") {
            Some(v) => v.as_str().ok_or_else(|| not_a("weighting", "a string"))?.parse()?,
            None => defaults.weighting
        };

        let hyper = Hyperparams {
            window_size,
            shift: get_f64(json, "shift", defaults.shift)?,
            alpha: get_f64(json, "alpha", defaults.alpha)?,
            weighting,
            context_smoothing: get_bool(json, "context_smoothing", defaults.context_smoothing)?,
            seed: get_u64(json, "seed", defaults.seed)?,
        };

        let params = JsonTypes {
            corpus_file: get_path(json, "corpus_file")?,
            vocab_files: get_paths(json, "vocab_file")?,
            lowercase: get_bool(json, "lowercase", false)?,
            output_dir: get_path(json, "output_dir")?
                .ok_or_else(|| PpmiError::Config("output_dir was not supplied through json".into()))?,
            num_threads: get_u64(json, "num_threads", 4)? as usize,
            batch_docs: get_u64(json, "batch_docs", 10000)? as usize,
            saved_counts: get_bool(json, "saved_counts", false)?,
            saved_ppmi: get_bool(json, "saved_ppmi", false)?,
            write_csv: get_bool(json, "write_csv", true)?,
            hyper,
        };

        let config = Self { params };
        config.validate()?;
        Ok(config)
    }

    // all checks that do not need the filesystem run here, before any stage starts
    fn validate(&self) -> Result<()> {

        let params = &self.params;
        params.hyper.validate()?;

        if params.num_threads == 0 {
            return Err(PpmiError::Config("num_threads must be positive".into()));
        }
        if params.batch_docs == 0 {
            return Err(PpmiError::Config("batch_docs must be positive".into()));
        }
        if !params.saved_counts && !params.saved_ppmi {
            if params.corpus_file.is_none() {
                return Err(PpmiError::Config("corpus_file was not supplied through json".into()));
            }
            if params.vocab_files.is_empty() {
                return Err(PpmiError::Config("vocab_file was not supplied through json".into()));
            }
        }
        Ok(())
    }
}

fn not_a(key: &str, what: &str) -> PpmiError {
    PpmiError::Config(format!("given {} is not {}", key, what))
}

fn get_f64(json: &Value, key: &str, default: f64) -> Result<f64> {
    match json.get(key) {
        Some(v) => v.as_f64().ok_or_else(|| not_a(key, "numeric")),
        None => Ok(default)
    }
}

fn get_u64(json: &Value, key: &str, default: u64) -> Result<u64> {
    match json.get(key) {
        Some(v) => v.as_u64().ok_or_else(|| not_a(key, "a non-negative integer")),
        None => Ok(default)
    }
}

fn get_bool(json: &Value, key: &str, default: bool) -> Result<bool> {
    match json.get(key) {
        Some(v) => v.as_bool().ok_or_else(|| not_a(key, "boolean")),
        None => Ok(default)
    }
}

// a single path or a list of paths
fn get_paths(json: &Value, key: &str) -> Result<Vec<PathBuf>> {
    match json.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(PathBuf::from).ok_or_else(|| not_a(key, "a list of strings")))
            .collect(),
        Some(_) => Ok(get_path(json, key)?.into_iter().collect()),
        None => Ok(Vec::new())
    }
}

fn get_path(json: &Value, key: &str) -> Result<Option<PathBuf>> {
    match json.get(key) {
        Some(v) => Ok(Some(PathBuf::from(v.as_str().ok_or_else(|| not_a(key, "a string"))?))),
        None => Ok(None)
    }
}


#[cfg(test)]
mod tests {

    use std::path::PathBuf;
    use serde_json::json;
    use super::{Config, Hyperparams};
    use crate::error::PpmiError;
    use crate::window::Weighting;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = Config::from_json(&json!({
            "corpus_file": "corpus.txt",
            "vocab_file": "words.txt",
            "output_dir": "out"
        })).unwrap();

        let params = config.get_params();
        assert_eq!(params.hyper, Hyperparams::default());
        assert_eq!(params.num_threads, 4);
        assert_eq!(params.batch_docs, 10000);
        assert!(params.write_csv);
        assert!(!params.saved_counts && !params.saved_ppmi);
    }

    #[test]
    fn reads_given_hyperparams() {
        let config = Config::from_json(&json!({
            "corpus_file": "corpus.txt",
            "vocab_file": "words.txt",
            "output_dir": "out",
            "window_size": 5,
            "shift": 5.0,
            "alpha": 1.0,
            "weighting": "word2vec",
            "seed": 7
        })).unwrap();

        let hyper = config.get_params().hyper;
        assert_eq!(hyper.window_size, 5);
        assert_eq!(hyper.shift, 5.0);
        assert_eq!(hyper.alpha, 1.0);
        assert_eq!(hyper.weighting, Weighting::Variable);
        assert_eq!(hyper.seed, 7);
    }

    #[test]
    fn rejects_bad_hyperparams() {
        let base = |extra: serde_json::Value| {
            let mut json = json!({"corpus_file": "c", "vocab_file": "v", "output_dir": "o"});
            for (k, v) in extra.as_object().unwrap() {
                json[k] = v.clone();
            }
            Config::from_json(&json)
        };

        for bad in [
            json!({"window_size": 0}),
            json!({"window_size": -2}),
            json!({"window_size": "two"}),
            json!({"shift": 0.0}),
            json!({"shift": -1.0}),
            json!({"alpha": 0.0}),
            json!({"alpha": 1.5}),
            json!({"weighting": "cbow"}),
            json!({"num_threads": 0}),
        ] {
            match base(bad.clone()) {
                Err(PpmiError::Config(_)) => {},
                Err(e) => panic!("{} gave unexpected error {}", bad, e),
                Ok(_) => panic!("{} was accepted", bad),
            }
        }
    }

    #[test]
    fn vocab_file_takes_one_path_or_a_list() {
        let single = Config::from_json(&json!({
            "corpus_file": "c", "vocab_file": "words.txt", "output_dir": "o"
        })).unwrap().get_params();
        assert_eq!(single.vocab_files, vec![PathBuf::from("words.txt")]);
        assert!(!single.lowercase);

        let many = Config::from_json(&json!({
            "corpus_file": "c", "vocab_file": ["a.txt", "b.txt"], "output_dir": "o", "lowercase": true
        })).unwrap().get_params();
        assert_eq!(many.vocab_files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(many.lowercase);

        for bad in [json!([]), json!(["a.txt", 3]), json!(7)] {
            let json = json!({"corpus_file": "c", "vocab_file": bad, "output_dir": "o"});
            assert!(matches!(Config::from_json(&json), Err(PpmiError::Config(_))), "{}", bad);
        }
    }

    #[test]
    fn resuming_does_not_need_corpus() {
        assert!(Config::from_json(&json!({"output_dir": "out"})).is_err());
        assert!(Config::from_json(&json!({"output_dir": "out", "saved_ppmi": true})).is_ok());
    }

    #[test]
    fn expects_single_path_argument() {
        let args = vec!["ppmi_model".to_string()];
        assert!(matches!(Config::new(&args), Err(PpmiError::Config(_))));
    }
}
