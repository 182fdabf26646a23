use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{Segmentation, TokenizeConfig};
use crate::error::TokenizeError;
use crate::punctuation::strip_punctuation;
use crate::stopwords::Stopwords;
use crate::token::TokenSet;

/// A validated tokenizer with its stopword set resolved.
///
/// Cheap to share: it is immutable after construction and `Sync`, so one
/// instance serves every worker of a run.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    cfg: TokenizeConfig,
    stopwords: Stopwords,
}

impl Tokenizer {
    pub fn new(cfg: TokenizeConfig) -> Result<Self, TokenizeError> {
        cfg.validate()?;
        let mut stopwords = if cfg.use_builtin_stopwords {
            Stopwords::builtin()
        } else {
            Stopwords::empty()
        };
        stopwords.extend(cfg.extra_stopwords.iter().cloned());
        Ok(Self { cfg, stopwords })
    }

    pub fn config(&self) -> &TokenizeConfig {
        &self.cfg
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Turn raw text into its [`TokenSet`].
    ///
    /// Empty or punctuation-only input yields an empty token set; each
    /// consumer applies its own empty-input policy.
    pub fn tokenize(&self, text: &str) -> TokenSet {
        // Normalization first, as it can change character boundaries.
        let normalized: Cow<str> = if self.cfg.normalize_unicode {
            Cow::Owned(text.nfkc().collect::<String>())
        } else {
            Cow::Borrowed(text)
        };
        let cased: Cow<str> = if self.cfg.lowercase {
            Cow::Owned(normalized.to_lowercase())
        } else {
            normalized
        };

        let (stripped_text, removed_punctuation) =
            strip_punctuation(&cased, self.cfg.strip_unicode_punctuation);

        let tokens = segment(&stripped_text, self.cfg.segmentation);
        let filtered = self.stopwords.filter(&tokens);

        TokenSet::from_parts(stripped_text, removed_punctuation, tokens, filtered)
    }
}

fn segment(text: &str, segmentation: Segmentation) -> Vec<String> {
    match segmentation {
        Segmentation::Whitespace => text.split_whitespace().map(str::to_string).collect(),
        Segmentation::UnicodeWords => text
            .split_word_bounds()
            .filter(|w| !w.trim().is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// One-shot helper: build a [`Tokenizer`] and tokenize `text`.
///
/// Prefer constructing a [`Tokenizer`] once when processing many documents.
pub fn tokenize(text: &str, cfg: &TokenizeConfig) -> Result<TokenSet, TokenizeError> {
    Ok(Tokenizer::new(cfg.clone())?.tokenize(text))
}
