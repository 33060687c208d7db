// persistence of the three stage outputs.
//
// every artifact is bincode wrapped in gzip and starts with a header naming
// its schema and version. Words are stored once in a sorted table and all
// composite keys are u32 indices into that table, so a (word, context) key
// is the row (i, j) and a PPMI vector is (i, [(j, score), ...]).

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Serialize, Deserialize, de::DeserializeOwned};

use crate::config::Hyperparams;
use crate::cooccurrence::CoocTable;
use crate::error::{PpmiError, Result};
use crate::ppmi::PpmiSpace;
use crate::similarity::Similarities;
use crate::vocab::Vocabulary;

pub const SCHEMA_VERSION: u32 = 1;

pub const COUNTS_FILE: &str = "wc-counts";
pub const PPMI_FILE: &str = "ppmi-vecs";
pub const SIMS_FILE: &str = "ppmi-sims";
pub const METADATA_FILE: &str = "metadata.json";

const EXTENSION: &str = ".bin.gz";

const COUNTS_SCHEMA: &str = "ppmi-model/wc-counts";
const PPMI_SCHEMA: &str = "ppmi-model/ppmi-vecs";
const SIMS_SCHEMA: &str = "ppmi-model/ppmi-sims";

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Header {
    schema: String,
    version: u32,
}

impl Header {

    fn new(schema: &str) -> Header {
        Self { schema: schema.to_string(), version: SCHEMA_VERSION }
    }

    fn check(&self, schema: &str) -> Result<()> {
        if self.schema != schema {
            return Err(PpmiError::Artifact(format!("expected a {} artifact, found {}", schema, self.schema)));
        }
        if self.version != SCHEMA_VERSION {
            return Err(PpmiError::Artifact(format!(
                "{} schema version {} is not supported (expected {})", schema, self.version, SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CountsRecord {
    header: Header,
    words: Vec<String>,
    entries: Vec<(u32, u32, f64)>,
}

#[derive(Serialize, Deserialize)]
struct PpmiRecord {
    header: Header,
    words: Vec<String>,
    rows: Vec<(u32, Vec<(u32, f64)>)>,
}

#[derive(Serialize, Deserialize)]
struct SimilarityRecord {
    header: Header,
    words: Vec<String>,
    entries: Vec<(u32, u32, f64)>,
}

/// Describes a run next to its artifacts. On a resumed run `resumed_from`
/// names the artifact that was loaded; `hyper` then only describes the stages
/// computed after it, the loaded artifact keeps the settings it was made with.
#[derive(Debug, Serialize)]
pub struct RunMetadata<'a> {
    pub version: &'static str,
    pub schema_version: u32,
    pub hyper: &'a Hyperparams,
    pub resumed_from: Option<String>,
    pub artifacts: Vec<String>,
}

impl<'a> RunMetadata<'a> {
    pub fn new(hyper: &'a Hyperparams) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            schema_version: SCHEMA_VERSION,
            hyper,
            resumed_from: None,
            artifacts: [COUNTS_FILE, PPMI_FILE, SIMS_FILE].iter().map(|f| format!("{}{}", f, EXTENSION)).collect(),
        }
    }

    pub fn resumed_from(mut self, file_name: &str) -> Self {
        self.resumed_from = Some(format!("{}{}", file_name, EXTENSION));
        self
    }
}


pub fn read_input<R: ReadFile>(file_path: &Path) -> Result<R> {
    R::read_file(file_path)
}

/// Saves `item` under `output_dir`, creating the directory if needed, and
/// returns the written path.
pub fn save_output<S: SaveFile>(output_dir: &Path, file_name: &str, item: &S) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    item.save_file(output_dir, file_name)
}

pub trait ReadFile: Sized {
    /// `file_path` is the artifact path without its extension.
    fn read_file(file_path: &Path) -> Result<Self>;
}

pub trait SaveFile {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf>;
}

fn with_extension(file_path: &Path) -> PathBuf {
    let mut out = OsString::from(file_path.as_os_str());
    out.push(EXTENSION);
    PathBuf::from(out)
}

fn write_gz<T: Serialize>(out: &Path, record: &T) -> Result<()> {
    let f = BufWriter::new(File::create(out)?);
    let mut writer = GzEncoder::new(f, Compression::default());
    bincode::serialize_into(&mut writer, record)?;
    writer.finish()?.flush()?;
    Ok(())
}

fn read_gz<T: DeserializeOwned>(in_file: &Path) -> Result<T> {
    let f = File::open(in_file).map_err(|e| PpmiError::input(in_file, e))?;
    let reader = GzDecoder::new(BufReader::new(f));
    Ok(bincode::deserialize_from(reader)?)
}

fn index(id: usize) -> Result<u32> {
    u32::try_from(id).map_err(|_| PpmiError::Artifact(format!("word index {} does not fit the u32 schema", id)))
}

// rebuilds the vocabulary and makes sure its ids are the stored indices
fn vocabulary(words: Vec<String>) -> Result<Arc<Vocabulary>> {
    let vocab = Vocabulary::new(words.iter().cloned());
    if vocab.words() != words.as_slice() {
        return Err(PpmiError::Artifact("word table is not sorted and unique".into()));
    }
    Ok(Arc::new(vocab))
}

fn resolve(vocab: &Vocabulary, i: u32) -> Result<usize> {
    let i = i as usize;
    if i >= vocab.len() {
        return Err(PpmiError::Artifact(format!("word index {} out of range for {} words", i, vocab.len())));
    }
    Ok(i)
}


impl SaveFile for CoocTable {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {

        let entries = self
            .iter()
            .map(|(w, c, v)| -> Result<(u32, u32, f64)> { Ok((index(w)?, index(c)?, v)) })
            .collect::<Result<Vec<(u32, u32, f64)>>>()?;
        let record = CountsRecord {
            header: Header::new(COUNTS_SCHEMA),
            words: self.vocab().words().to_vec(),
            entries,
        };

        let out = with_extension(&output_dir.join(file_name));
        write_gz(&out, &record)?;
        Ok(out)
    }
}

impl ReadFile for CoocTable {
    fn read_file(file_path: &Path) -> Result<Self> {

        let record: CountsRecord = read_gz(&with_extension(file_path))?;
        record.header.check(COUNTS_SCHEMA)?;

        let vocab = vocabulary(record.words)?;
        let mut table = CoocTable::new(Arc::clone(&vocab));
        for (w, c, v) in record.entries {
            table.add(resolve(&vocab, w)?, resolve(&vocab, c)?, v);
        }
        Ok(table)
    }
}

impl SaveFile for PpmiSpace {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {

        let mut rows = Vec::with_capacity(self.len());
        for (w, vector) in self.iter() {
            let row = vector
                .iter()
                .map(|(c, s)| -> Result<(u32, f64)> { Ok((index(*c)?, *s)) })
                .collect::<Result<Vec<(u32, f64)>>>()?;
            rows.push((index(w)?, row));
        }
        let record = PpmiRecord {
            header: Header::new(PPMI_SCHEMA),
            words: self.vocab().words().to_vec(),
            rows,
        };

        let out = with_extension(&output_dir.join(file_name));
        write_gz(&out, &record)?;
        Ok(out)
    }
}

impl ReadFile for PpmiSpace {
    fn read_file(file_path: &Path) -> Result<Self> {

        let record: PpmiRecord = read_gz(&with_extension(file_path))?;
        record.header.check(PPMI_SCHEMA)?;

        let vocab = vocabulary(record.words)?;
        let mut space = PpmiSpace::new(Arc::clone(&vocab));
        for (w, row) in record.rows {
            let w = resolve(&vocab, w)?;
            for (c, s) in row {
                space.insert(w, resolve(&vocab, c)?, s);
            }
        }
        Ok(space)
    }
}

impl SaveFile for Similarities {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {

        let entries = self
            .iter()
            .map(|(i, j, s)| -> Result<(u32, u32, f64)> { Ok((index(i)?, index(j)?, s)) })
            .collect::<Result<Vec<(u32, u32, f64)>>>()?;
        let record = SimilarityRecord {
            header: Header::new(SIMS_SCHEMA),
            words: self.vocab().words().to_vec(),
            entries,
        };

        let out = with_extension(&output_dir.join(file_name));
        write_gz(&out, &record)?;
        Ok(out)
    }
}

impl ReadFile for Similarities {
    fn read_file(file_path: &Path) -> Result<Self> {

        let record: SimilarityRecord = read_gz(&with_extension(file_path))?;
        record.header.check(SIMS_SCHEMA)?;

        let vocab = vocabulary(record.words)?;
        let mut sims = Similarities::new(Arc::clone(&vocab));
        for (i, j, s) in record.entries {
            sims.insert(resolve(&vocab, i)?, resolve(&vocab, j)?, s);
        }
        Ok(sims)
    }
}

/// Human readable copy of the similarities, one `word1,word2,similarity` row per pair.
pub fn save_csv(sims: &Similarities, output_dir: &Path, file_name: &str) -> Result<PathBuf> {

    fs::create_dir_all(output_dir)?;
    let out = output_dir.join(format!("{}.csv", file_name));
    let mut wrt = csv::WriterBuilder::new().from_path(&out)?;
    wrt.write_record(["word1", "word2", "similarity"])?;

    for (w, o, s) in sims.iter_words() {
        wrt.serialize((w, o, s))?;
    }
    wrt.flush()?;
    Ok(out)
}

pub fn save_metadata(metadata: &RunMetadata, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let out = output_dir.join(METADATA_FILE);
    let f = BufWriter::new(File::create(&out)?);
    serde_json::to_writer_pretty(f, metadata)?;
    Ok(out)
}
