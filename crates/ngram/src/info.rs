//! Scalar document features: ratios, entropy, sentence and bracket counts.

use serde::{Deserialize, Serialize};
use tokenize::{split_sentences, TokenSet};

use crate::round4;
use crate::table::NgramTable;
use crate::{EmptyPolicy, NgramError};

const TERMINAL_PUNCTUATION: &[char] = &['。', '！', '；', '？', '.', '!', ';', '?', '"', '”'];
const BRACKETS: &[char] = &['(', ')', '（', '）', '{', '}'];

/// Scalar features of one document. Field names are the emitted record keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleInfo {
    /// Share of tokens kept after stopword filtering.
    pub stop_ratio: f64,
    /// Removed punctuation characters per token.
    pub puncs_ratio: f64,
    /// Share of tokens that repeat an earlier token.
    pub word_unique_ratio: f64,
    pub num_sentences: usize,
    /// Base-2 Shannon entropy of the token distribution.
    pub word_entropy: f64,
    pub is_ending_with_terminal_punctuation: bool,
    /// Mean token length in characters.
    pub mean_word_length: f64,
    pub curly_bracket: usize,
    /// Characters of the punctuation-stripped text.
    pub word_count: usize,
    pub num_words: usize,
}

fn ratio(
    numerator: f64,
    denominator: usize,
    policy: EmptyPolicy,
    metric: &'static str,
) -> Result<f64, NgramError> {
    if denominator == 0 {
        return match policy {
            EmptyPolicy::Zero => Ok(0.0),
            EmptyPolicy::Fail => Err(NgramError::EmptyInput { metric }),
        };
    }
    Ok(round4(numerator / denominator as f64))
}

fn entropy(tokens: &[String], policy: EmptyPolicy) -> Result<f64, NgramError> {
    let table = NgramTable::build(tokens, 1);
    if table.total() == 0 {
        return match policy {
            EmptyPolicy::Zero => Ok(0.0),
            EmptyPolicy::Fail => Err(NgramError::EmptyInput {
                metric: "word_entropy",
            }),
        };
    }
    let total = table.total() as f64;
    let h: f64 = table
        .iter()
        .map(|(_, count)| {
            let p = count as f64 / total;
            p * (total / count as f64).log2()
        })
        .sum();
    Ok(round4(h))
}

/// Compute the scalar features of `text` and its token set.
///
/// Counts (`num_sentences`, `curly_bracket`, `word_count`, `num_words`) are
/// always defined. Ratios, the mean and the entropy follow `policy` when
/// the token sequence is empty.
pub fn simple_info(
    text: &str,
    tokens: &TokenSet,
    policy: EmptyPolicy,
) -> Result<SimpleInfo, NgramError> {
    let num_words = tokens.tokens.len();
    let total_chars: usize = tokens.tokens.iter().map(|t| t.chars().count()).sum();

    let stop_ratio = ratio(tokens.filtered.len() as f64, num_words, policy, "stop_ratio")?;
    let puncs_ratio = ratio(
        tokens.removed_punctuation as f64,
        num_words,
        policy,
        "puncs_ratio",
    )?;
    let word_unique_ratio = ratio(
        num_words.saturating_sub(tokens.unique.len()) as f64,
        num_words,
        policy,
        "word_unique_ratio",
    )?;
    let mean_word_length = ratio(total_chars as f64, num_words, policy, "mean_word_length")?;
    let word_entropy = entropy(&tokens.tokens, policy)?;

    let is_ending_with_terminal_punctuation = text
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| TERMINAL_PUNCTUATION.contains(&c));

    Ok(SimpleInfo {
        stop_ratio,
        puncs_ratio,
        word_unique_ratio,
        num_sentences: split_sentences(text).len(),
        word_entropy,
        is_ending_with_terminal_punctuation,
        mean_word_length,
        curly_bracket: text.chars().filter(|c| BRACKETS.contains(c)).count(),
        word_count: tokens.char_count(),
        num_words,
    })
}
