// errors of every pipeline stage, with a crate wide `Result` alias.

use std::path::PathBuf;
use thiserror::Error;

use crate::progress::Stage;

#[derive(Debug, Error)]
pub enum PpmiError {
    /// Invalid hyperparameters, run configuration or vocabulary.
    #[error("configuration error: {0}")]
    Config(String),

    /// Corpus or word list missing or unreadable.
    #[error("input error: cannot read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage received input it cannot compute anything from.
    #[error("degenerate computation in {stage} stage: {reason}")]
    Degenerate { stage: Stage, reason: String },

    /// A persisted artifact does not match the expected schema.
    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PpmiError {
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PpmiError::Input { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, PpmiError>;
