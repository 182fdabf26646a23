use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Per-document token views.
///
/// Recomputed for every run; nothing here is cached across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    /// Text after normalization and punctuation removal.
    pub stripped_text: String,
    /// Number of punctuation characters removed from the input.
    pub removed_punctuation: usize,
    /// Raw token sequence, in text order.
    pub tokens: Vec<String>,
    /// Stopword-filtered subsequence of `tokens`, order preserved.
    pub filtered: Vec<String>,
    /// Distinct tokens, sorted.
    pub unique: BTreeSet<String>,
}

impl TokenSet {
    /// Assemble a token set from a raw sequence and its filtered view.
    pub fn from_parts(
        stripped_text: String,
        removed_punctuation: usize,
        tokens: Vec<String>,
        filtered: Vec<String>,
    ) -> Self {
        let unique = tokens.iter().cloned().collect();
        Self {
            stripped_text,
            removed_punctuation,
            tokens,
            filtered,
            unique,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Characters in the punctuation-stripped text.
    pub fn char_count(&self) -> usize {
        self.stripped_text.chars().count()
    }
}
