use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use ngram::{ngram_counts, round4, EmptyPolicy};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

use crate::config::check_model_name;
use crate::WordgramError;

/// Bump whenever the persisted model layout changes.
pub const MODEL_SCHEMA_VERSION: u16 = 1;

/// File extension of persisted models.
pub const MODEL_EXTENSION: &str = "wgm";

const KEY_SEPARATOR: char = '\u{1f}';
const ZSTD_LEVEL: i32 = 3;

fn ngram_key<S: AsRef<str>>(ngram: &[S]) -> String {
    let mut key = String::new();
    for (i, token) in ngram.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(token.as_ref());
    }
    key
}

/// Word n-gram frequency model of one reference corpus at one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordgramModel {
    pub name: String,
    pub order: usize,
    counts: BTreeMap<String, u64>,
    total: u64,
}

#[derive(Serialize, Deserialize)]
struct PersistedModel {
    schema_version: u16,
    model: WordgramModel,
}

impl WordgramModel {
    /// Count every `order`-token window of `tokens`.
    pub fn build<S: AsRef<str> + std::hash::Hash + Eq>(
        name: impl Into<String>,
        tokens: &[S],
        order: usize,
    ) -> Self {
        let table = ngram_counts(tokens, order);
        let counts = table
            .iter()
            .map(|(gram, count)| (ngram_key(gram), count as u64))
            .collect();
        Self {
            name: name.into(),
            order,
            counts,
            total: table.total() as u64,
        }
    }

    /// Number of n-gram occurrences seen in the corpus.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct n-grams seen in the corpus.
    pub fn distinct(&self) -> u64 {
        self.counts.len() as u64
    }

    pub fn count<S: AsRef<str>>(&self, ngram: &[S]) -> u64 {
        self.counts.get(&ngram_key(ngram)).copied().unwrap_or(0)
    }

    /// Laplace-smoothed probability `(count + 1) / (total + distinct)`.
    ///
    /// Never zero, even for an empty model.
    pub fn prob<S: AsRef<str>>(&self, ngram: &[S]) -> f64 {
        let denominator = (self.total + self.distinct()).max(1) as f64;
        (self.count(ngram) + 1) as f64 / denominator
    }

    /// Log-likelihood of `tokens` under this model.
    ///
    /// Sums the natural log of the smoothed probability of every window of
    /// `order` tokens, rounded to 4 decimals. A sequence shorter than the
    /// order has no windows and follows `policy`.
    pub fn score<S: AsRef<str>>(
        &self,
        tokens: &[S],
        policy: EmptyPolicy,
    ) -> Result<f64, WordgramError> {
        if self.order == 0 || tokens.len() < self.order {
            return match policy {
                EmptyPolicy::Zero => Ok(0.0),
                EmptyPolicy::Fail => Err(WordgramError::EmptyInput {
                    model: self.name.clone(),
                    order: self.order,
                }),
            };
        }
        let log_likelihood: f64 = tokens
            .windows(self.order)
            .map(|window| self.prob(window).ln())
            .sum();
        Ok(round4(log_likelihood))
    }

    /// Path this model is written to under `dir`.
    pub fn file_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{MODEL_EXTENSION}", self.name))
    }

    /// Write the model to `{dir}/{name}.wgm`, creating `dir` if needed.
    ///
    /// Names that are not a single plain path component are rejected.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, WordgramError> {
        check_model_name(&self.name)?;
        let path = self.file_path(dir);
        let save_err = |reason: String| WordgramError::ModelSave {
            path: path.display().to_string(),
            reason,
        };

        fs::create_dir_all(dir).map_err(|e| save_err(e.to_string()))?;
        let persisted = PersistedModel {
            schema_version: MODEL_SCHEMA_VERSION,
            model: self.clone(),
        };
        let encoded = encode_to_vec(&persisted, standard()).map_err(|e| save_err(e.to_string()))?;
        let compressed =
            encode_all(encoded.as_slice(), ZSTD_LEVEL).map_err(|e| save_err(e.to_string()))?;
        fs::write(&path, compressed).map_err(|e| save_err(e.to_string()))?;
        Ok(path)
    }

    /// Read a model written by [`WordgramModel::save`].
    pub fn load(path: &Path) -> Result<Self, WordgramError> {
        let load_err = |reason: String| WordgramError::ModelLoad {
            path: path.display().to_string(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let decompressed =
            decode_all(bytes.as_slice()).map_err(|e| load_err(format!("decompress: {e}")))?;
        let (persisted, _): (PersistedModel, usize) = decode_from_slice(&decompressed, standard())
            .map_err(|e| load_err(format!("decode: {e}")))?;
        if persisted.schema_version != MODEL_SCHEMA_VERSION {
            return Err(load_err(format!(
                "schema version {} (expected {MODEL_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        Ok(persisted.model)
    }
}
