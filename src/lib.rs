pub mod artifacts;
pub mod config;
pub mod cooccurrence;
pub mod error;
pub mod pipeline;
pub mod ppmi;
pub mod progress;
pub mod similarity;
pub mod vocab;
pub mod window;

pub use config::{Config, Hyperparams};
pub use cooccurrence::{CoocTable, Counts};
pub use error::{PpmiError, Result};
pub use pipeline::Pipeline;
pub use ppmi::{Ppmi, PpmiSpace};
pub use progress::{LogProgress, Progress, Silent, Stage};
pub use similarity::{Similarities, Similarity};
pub use vocab::Vocabulary;
pub use window::Weighting;
