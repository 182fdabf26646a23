//! Importance scoring against reference-corpus word n-gram models.
//!
//! Each named reference corpus is tokenized and counted at every configured
//! n-gram order (2 and 3 by default). A document's score against a model is
//! the log-likelihood of its sliding n-gram windows under Laplace-smoothed
//! probabilities; less negative means closer to the reference vocabulary.
//!
//! Models persist as `{name}.wgm` files (bincode, zstd-compressed, behind a
//! schema version) and can be reloaded without the source text.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use tokenize::{Tokenizer, TokenizeConfig};
//! use wordgram::{ImportanceScorer, WordgramConfig};
//!
//! let tokenizer = Tokenizer::new(TokenizeConfig::default()).unwrap();
//! let mut corpora = BTreeMap::new();
//! corpora.insert("wiki".to_string(), vec!["北京 是 中国 的 首都".to_string()]);
//! let scorer = ImportanceScorer::from_corpora(&corpora, &tokenizer, &WordgramConfig::default()).unwrap();
//!
//! let fields = scorer.score_fields(&["北京", "是", "中国"]).unwrap();
//! assert!(fields.contains_key("importance_sample_with_wiki(2-gram)"));
//! ```

mod config;
mod model;
mod scorer;

pub use crate::config::{CorpusFile, ModelSpec, WordgramConfig, WordgramError};
pub use crate::model::{WordgramModel, MODEL_EXTENSION, MODEL_SCHEMA_VERSION};
pub use crate::scorer::{ImportanceScorer, FIELD_PREFIX};
