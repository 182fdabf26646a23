//! Configuration types for the tokenizer.
//!
//! [`TokenizeConfig`] controls how raw document text is turned into a
//! [`TokenSet`](crate::TokenSet). Every downstream stage (n-gram statistics,
//! importance scoring, MinHash signatures) consumes the same token set, so
//! a single config governs the whole run.
//!
//! # Versioning
//!
//! The `version` field tracks behavior changes. Any change that can alter
//! the token stream for the same input must bump it so persisted wordgram
//! models built under an older tokenizer are not silently mixed with new
//! ones.
//!
//! # Examples
//!
//! ```rust
//! use tokenize::{Segmentation, TokenizeConfig};
//!
//! let config = TokenizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert_eq!(config.segmentation, Segmentation::Whitespace);
//!
//! let cjk = TokenizeConfig::default().with_segmentation(Segmentation::UnicodeWords);
//! assert_eq!(cjk.segmentation, Segmentation::UnicodeWords);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TokenizeError;

/// How the punctuation-stripped text is split into tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    /// Maximal runs of non-whitespace characters.
    ///
    /// Suited to space-delimited languages and to CJK text that an upstream
    /// segmenter has already split with spaces ("我 爱 北京").
    #[default]
    Whitespace,
    /// Unicode (UAX#29) word boundaries.
    ///
    /// Han ideographs have no word boundaries in UAX#29, so each ideograph
    /// becomes its own token.
    UnicodeWords,
}

/// Configuration for the tokenizer.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "normalize_unicode": false,
///   "lowercase": false,
///   "strip_unicode_punctuation": true,
///   "segmentation": "whitespace",
///   "use_builtin_stopwords": true,
///   "extra_stopwords": []
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenizeConfig {
    /// Tokenizer behavior version. Must be >= 1.
    pub version: u32,

    /// Apply Unicode NFKC normalization before anything else.
    ///
    /// NFKC folds full-width forms onto their ASCII counterparts, so it
    /// changes character counts. Off by default so that character-based
    /// metrics reflect the text as supplied.
    pub normalize_unicode: bool,

    /// Apply locale-free Unicode lowercasing before segmentation and
    /// stopword matching.
    pub lowercase: bool,

    /// Strip every character in a Unicode punctuation category in addition
    /// to the built-in CJK/ASCII punctuation set.
    pub strip_unicode_punctuation: bool,

    /// Segmentation strategy.
    pub segmentation: Segmentation,

    /// Include the built-in Chinese and English stopword lists.
    pub use_builtin_stopwords: bool,

    /// Additional stopwords, matched exactly against (optionally
    /// lowercased) tokens.
    pub extra_stopwords: Vec<String>,
}

impl TokenizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = segmentation;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_normalize_unicode(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_stopwords.extend(words.into_iter().map(Into::into));
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), TokenizeError> {
        if self.version == 0 {
            return Err(TokenizeError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if let Some(word) = self
            .extra_stopwords
            .iter()
            .find(|w| w.trim().is_empty() || w.chars().any(char::is_whitespace))
        {
            return Err(TokenizeError::InvalidConfig(format!(
                "stopword {word:?} is empty or contains whitespace"
            )));
        }
        Ok(())
    }
}

impl Default for TokenizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: false,
            lowercase: false,
            strip_unicode_punctuation: true,
            segmentation: Segmentation::Whitespace,
            use_builtin_stopwords: true,
            extra_stopwords: Vec::new(),
        }
    }
}
