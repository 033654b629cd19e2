use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use burn::{
    config::Config,
    prelude::Backend,
    tensor::{Int, Tensor, TensorData},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    tokenizing::{split_lines, tokenize_line},
    vocabulary::Vocabulary,
};

pub const TRAIN_FILE: &str = "train.src";
pub const VALID_FILE: &str = "valid.src";
pub const TEST_FILE: &str = "test.src";

/// Fill value for short lines in padded mode.
pub const PAD_ID: i32 = 0;

#[derive(Debug, Config)]
pub struct CorpusConfig {
    /// Emit one zero-padded row per line instead of one flat sequence.
    #[config(default = false)]
    pub keep_sentence_boundaries: bool,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("missing corpus file {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("{}:{line}: stream did not contain valid UTF-8", .path.display())]
    Decode { path: PathBuf, line: usize },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: token {word:?} missing from the vocabulary", .path.display())]
    UnknownToken { path: PathBuf, word: String },
}

/// Row-major `rows x cols` ids, each line right-padded with [`PAD_ID`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSequences {
    ids: Vec<i32>,
    rows: usize,
    cols: usize,
}

impl PaddedSequences {
    /// Pads every row up to `width`, widened to the longest row if needed.
    pub(crate) fn from_rows(rows: Vec<Vec<i32>>, width: usize) -> Self {
        let width = rows.iter().map(Vec::len).fold(width, usize::max);
        let n_rows = rows.len();
        let mut ids = Vec::with_capacity(n_rows * width);

        for mut row in rows {
            row.resize(width, PAD_ID);
            ids.extend(row);
        }

        Self {
            ids,
            rows: n_rows,
            cols: width,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn row(&self, index: usize) -> Option<&[i32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.ids[start..start + self.cols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[i32]> {
        // every line holds at least the marker, so cols == 0 only when rows == 0
        self.ids.chunks(self.cols.max(1))
    }

    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2, Int> {
        let data = TensorData::new(self.ids.clone(), [self.rows, self.cols]);

        Tensor::from_data(data, device)
    }
}

/// The encoded form of one corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedSplit {
    Flat(Vec<i32>),
    Padded(PaddedSequences),
}

impl EncodedSplit {
    /// Number of ids, padding included.
    pub fn len(&self) -> usize {
        match self {
            EncodedSplit::Flat(ids) => ids.len(),
            EncodedSplit::Padded(padded) => padded.ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_flat(&self) -> Option<&[i32]> {
        match self {
            EncodedSplit::Flat(ids) => Some(ids),
            EncodedSplit::Padded(_) => None,
        }
    }

    pub fn as_padded(&self) -> Option<&PaddedSequences> {
        match self {
            EncodedSplit::Flat(_) => None,
            EncodedSplit::Padded(padded) => Some(padded),
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            EncodedSplit::Flat(ids) => vec![ids.len()],
            EncodedSplit::Padded(padded) => vec![padded.rows, padded.cols],
        }
    }

    pub fn to_tensor_data(&self) -> TensorData {
        match self {
            EncodedSplit::Flat(ids) => TensorData::new(ids.clone(), [ids.len()]),
            EncodedSplit::Padded(padded) => {
                TensorData::new(padded.ids.clone(), [padded.rows, padded.cols])
            }
        }
    }

    pub fn flat_tensor<B: Backend>(&self, device: &B::Device) -> Option<Tensor<B, 1, Int>> {
        self.as_flat().map(|ids| {
            let data = TensorData::new(ids.to_vec(), [ids.len()]);
            Tensor::from_data(data, device)
        })
    }
}

#[derive(Debug, Default)]
struct FileStats {
    lines: usize,
    tokens: usize,
    max_len: usize,
}

/// Builds one shared vocabulary while encoding files, two passes per file.
#[derive(Debug, Default)]
pub struct CorpusLoader {
    keep_sentence_boundaries: bool,
    vocabulary: Vocabulary,
}

impl CorpusLoader {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            keep_sentence_boundaries: config.keep_sentence_boundaries,
            vocabulary: Vocabulary::new(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn into_vocabulary(self) -> Vocabulary {
        self.vocabulary
    }

    /// Adds every token of `path` to the vocabulary, then encodes the file.
    pub fn tokenize(&mut self, path: impl AsRef<Path>) -> Result<EncodedSplit, CorpusError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CorpusError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let stats = self.grow_vocabulary(path)?;

        let split = if self.keep_sentence_boundaries {
            EncodedSplit::Padded(self.encode_padded(path, &stats)?)
        } else {
            EncodedSplit::Flat(self.encode_flat(path, &stats)?)
        };

        info!(
            path = %path.display(),
            lines = stats.lines,
            tokens = stats.tokens,
            max_len = stats.max_len,
            vocab_size = self.vocabulary.size(),
            "encoded corpus file"
        );

        Ok(split)
    }

    fn grow_vocabulary(&mut self, path: &Path) -> Result<FileStats, CorpusError> {
        let mut stats = FileStats::default();

        for_each_line(path, |line| {
            debug!(line, "pass 1");
            let mut len = 0;
            for word in tokenize_line(line) {
                self.vocabulary.add_word(word);
                len += 1;
            }
            stats.lines += 1;
            stats.tokens += len;
            stats.max_len = stats.max_len.max(len);
            Ok(())
        })?;

        Ok(stats)
    }

    fn encode_flat(&self, path: &Path, stats: &FileStats) -> Result<Vec<i32>, CorpusError> {
        let mut ids = Vec::with_capacity(stats.tokens);

        for_each_line(path, |line| {
            debug!(line, "pass 2");
            for word in tokenize_line(line) {
                ids.push(self.lookup(path, word)?);
            }
            Ok(())
        })?;

        Ok(ids)
    }

    fn encode_padded(
        &self,
        path: &Path,
        stats: &FileStats,
    ) -> Result<PaddedSequences, CorpusError> {
        let mut rows = Vec::with_capacity(stats.lines);

        for_each_line(path, |line| {
            debug!(line, "pass 2");
            let row = tokenize_line(line)
                .map(|word| self.lookup(path, word))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
            Ok(())
        })?;

        Ok(PaddedSequences::from_rows(rows, stats.max_len))
    }

    fn lookup(&self, path: &Path, word: &str) -> Result<i32, CorpusError> {
        self.vocabulary
            .id(word)
            .ok_or_else(|| CorpusError::UnknownToken {
                path: path.to_path_buf(),
                word: word.to_string(),
            })
    }
}

/// Opens `path` for the duration of one pass and feeds each line, without its
/// terminator, to `f`. `\n`, `\r\n` and a bare `\r` all end a line.
fn for_each_line(
    path: &Path,
    mut f: impl FnMut(&str) -> Result<(), CorpusError>,
) -> Result<(), CorpusError> {
    let file = File::open(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut chunk = Vec::new();
    let mut number = 0;

    loop {
        chunk.clear();
        let read = reader
            .read_until(b'\n', &mut chunk)
            .map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }

        let text = std::str::from_utf8(&chunk).map_err(|_| CorpusError::Decode {
            path: path.to_path_buf(),
            line: number + 1,
        })?;
        for line in split_lines(text) {
            number += 1;
            f(line)?;
        }
    }

    Ok(())
}

/// Train, validation and test splits sharing one vocabulary.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub vocabulary: Vocabulary,
    pub train: EncodedSplit,
    pub valid: EncodedSplit,
    pub test: EncodedSplit,
}

impl Corpus {
    /// Loads `train.src`, `valid.src` and `test.src` from `dir`, in that order.
    pub fn load(dir: impl AsRef<Path>, config: &CorpusConfig) -> Result<Self, CorpusError> {
        let dir = dir.as_ref();
        let mut loader = CorpusLoader::new(config);

        let train = loader.tokenize(dir.join(TRAIN_FILE))?;
        let valid = loader.tokenize(dir.join(VALID_FILE))?;
        let test = loader.tokenize(dir.join(TEST_FILE))?;

        Ok(Self {
            vocabulary: loader.into_vocabulary(),
            train,
            valid,
            test,
        })
    }
}
