//! docsift n-gram statistics.
//!
//! Computes the per-document repetition and quality features: duplicate and
//! top n-gram character ratios over the stopword-filtered tokens, plus the
//! scalar [`SimpleInfo`] features over the full token set and raw text.
//!
//! Every function is pure and deterministic. Empty token sequences follow
//! the configured [`EmptyPolicy`].
//!
//! ```rust
//! use ngram::{NgramConfig, NgramStats};
//! use tokenize::{tokenize, TokenizeConfig};
//!
//! let text = "今天 天气 很好";
//! let tokens = tokenize(text, &TokenizeConfig::default()).unwrap();
//! let stats = NgramStats::compute(text, &tokens, &NgramConfig::default()).unwrap();
//! assert_eq!(stats.ngrams["chars_dupe_2grams"], 0.0);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tokenize::TokenSet;

mod config;
mod info;
mod repetition;
mod table;

pub use crate::config::{EmptyPolicy, NgramConfig, NgramError};
pub use crate::info::{simple_info, SimpleInfo};
pub use crate::repetition::{chars_dupe_ngrams, chars_top_ngrams, key_ngrams, ngram_counts};
pub use crate::table::NgramTable;

/// Round to 4 decimal places, the precision of every reported ratio.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// All n-gram features of one document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NgramStats {
    /// `chars_dupe_{n}grams` / `chars_top_{n}grams` ratios.
    #[serde(flatten)]
    pub ngrams: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub info: SimpleInfo,
}

impl NgramStats {
    /// Repetition ratios over `tokens.filtered`, scalar features over the
    /// full token set and `text`.
    pub fn compute(text: &str, tokens: &TokenSet, cfg: &NgramConfig) -> Result<Self, NgramError> {
        let info = simple_info(text, tokens, cfg.empty_policy)?;
        Ok(Self {
            ngrams: key_ngrams(&tokens.filtered, cfg),
            info,
        })
    }

    /// Flatten into the partial record merged into the output.
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        let mut fields: BTreeMap<String, Value> = self
            .ngrams
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();
        let info = self.info;
        let scalars = [
            ("stop_ratio", Value::from(info.stop_ratio)),
            ("puncs_ratio", Value::from(info.puncs_ratio)),
            ("word_unique_ratio", Value::from(info.word_unique_ratio)),
            ("num_sentences", Value::from(info.num_sentences)),
            ("word_entropy", Value::from(info.word_entropy)),
            (
                "is_ending_with_terminal_punctuation",
                Value::from(info.is_ending_with_terminal_punctuation),
            ),
            ("mean_word_length", Value::from(info.mean_word_length)),
            ("curly_bracket", Value::from(info.curly_bracket)),
            ("word_count", Value::from(info.word_count)),
            ("num_words", Value::from(info.num_words)),
        ];
        fields.extend(scalars.into_iter().map(|(k, v)| (k.to_string(), v)));
        fields
    }
}
