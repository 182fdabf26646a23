//! docsift tokenizer.
//!
//! Turns raw document text into the token views every metric stage
//! consumes: the punctuation-stripped text, the raw token sequence, the
//! stopword-filtered subsequence and the set of distinct tokens.
//!
//! ## Steps
//!
//! 1. Optional Unicode NFKC normalization
//! 2. Optional locale-free lowercasing
//! 3. Punctuation and control-character removal (built-in CJK/ASCII set,
//!    optionally every Unicode punctuation category)
//! 4. Segmentation (whitespace or UAX#29 word boundaries)
//! 5. Stopword filtering (built-in Chinese + English lists plus extras)
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock, no locale. The same text and config produce the same
//! [`TokenSet`] on any machine.
//!
//! ```rust
//! use tokenize::{Tokenizer, TokenizeConfig};
//!
//! let tokenizer = Tokenizer::new(TokenizeConfig::default()).unwrap();
//! let set = tokenizer.tokenize("我 爱 北京 天安门。");
//! assert_eq!(set.tokens, vec!["我", "爱", "北京", "天安门"]);
//! assert_eq!(set.removed_punctuation, 1);
//! ```

mod config;
mod error;
mod pipeline;
mod punctuation;
mod sentence;
mod stopwords;
mod token;

pub use crate::config::{Segmentation, TokenizeConfig};
pub use crate::error::TokenizeError;
pub use crate::pipeline::{tokenize, Tokenizer};
pub use crate::punctuation::{is_builtin_punctuation, remove_punctuation, strip_punctuation};
pub use crate::sentence::split_sentences;
pub use crate::stopwords::Stopwords;
pub use crate::token::TokenSet;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_is_deterministic() {
        let tokenizer = Tokenizer::new(TokenizeConfig::default()).unwrap();
        let text = "你好啊，我叫小松鼠。你好啊，我叫小雪球。";
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn unsegmented_cjk_stays_one_token_under_whitespace_mode() {
        let tokenizer = Tokenizer::new(TokenizeConfig::default()).unwrap();
        let set = tokenizer.tokenize("你好啊，我叫小松鼠。");
        assert_eq!(set.tokens, vec!["你好啊我叫小松鼠"]);
        assert_eq!(set.removed_punctuation, 2);
    }

    #[test]
    fn tokenizer_is_send_and_sync() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Tokenizer>();
    }
}
