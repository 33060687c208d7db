use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{PpmiError, Result};

/// The fixed word list of a run. Words get dense ids in sorted order so
/// every table built over the same list indexes words identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

impl Vocabulary {

    pub fn new<I, S>(words: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut i2t: Vec<String> = words.into_iter().map(Into::into).collect();
        i2t.sort();
        i2t.dedup();

        let t2i = i2t
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_owned(), i))
            .collect::<HashMap<String, usize>>();

        Self { t2i, i2t }
    }

    /// Reads a one-word-per-line list; blank lines are ignored and duplicates collapse.
    pub fn read_file(file_path: &Path) -> Result<Vocabulary> {

        let f = File::open(file_path).map_err(|e| PpmiError::input(file_path, e))?;
        let mut words = Vec::new();
        for line in BufReader::new(f).lines() {
            let line = line.map_err(|e| PpmiError::input(file_path, e))?;
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_string());
            }
        }
        Ok(Vocabulary::new(words))
    }

    /// One master list from several word-list files, duplicates across files collapse.
    pub fn read_files(file_paths: &[PathBuf]) -> Result<Vocabulary> {

        let mut words: Vec<String> = Vec::new();
        for file_path in file_paths {
            words.extend(Vocabulary::read_file(file_path)?.i2t);
        }
        Ok(Vocabulary::new(words))
    }

    /// Same list with every word lowercased; words that only differed in case merge.
    pub fn lowercase(&self) -> Vocabulary {
        Vocabulary::new(self.i2t.iter().map(|w| w.to_lowercase()))
    }

    pub fn id(&self, word: &str) -> Option<usize> {
        self.t2i.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.t2i.contains_key(word)
    }

    /// Panics if `id` was not issued by this vocabulary.
    pub fn word(&self, id: usize) -> &str {
        &self.i2t[id]
    }

    pub fn words(&self) -> &[String] {
        &self.i2t
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }
}


#[cfg(test)]
mod tests {

    use std::io::Write;
    use super::Vocabulary;

    #[test]
    fn ids_are_sorted_and_deduplicated() {
        let vocab = Vocabulary::new(["pear", "apple", "pear", "Apple"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.words(), &["Apple", "apple", "pear"]);
        assert_eq!(vocab.id("apple"), Some(1));
        assert_eq!(vocab.word(2), "pear");
        // membership is case sensitive
        assert!(vocab.contains("Apple"));
        assert!(!vocab.contains("PEAR"));
    }

    #[test]
    fn read_word_list_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "dog\n  cat \n\ndog\nbird").unwrap();

        let vocab = Vocabulary::read_file(f.path()).unwrap();
        assert_eq!(vocab.words(), &["bird", "cat", "dog"]);
    }

    #[test]
    fn aggregate_several_word_lists() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "dog\ncat").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "cat\nBird\n\nemu").unwrap();

        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let vocab = Vocabulary::read_files(&paths).unwrap();
        assert_eq!(vocab.words(), &["Bird", "cat", "dog", "emu"]);

        let lower = vocab.lowercase();
        assert_eq!(lower.words(), &["bird", "cat", "dog", "emu"]);
        assert_eq!(Vocabulary::new(["Cat", "cat", "CAT"]).lowercase().len(), 1);
    }

    #[test]
    fn missing_word_list_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vocabulary::read_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, crate::error::PpmiError::Input { .. }));
    }
}
