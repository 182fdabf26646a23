//! Workspace umbrella crate for docsift.
//!
//! Stitches the stage crates into one batch pipeline over document
//! records: validation, optional exact dedup, tokenization, n-gram
//! statistics, reference-corpus importance, MinHash/LSH near-duplicate
//! queries, language identification and a deterministic merge into
//! [`ScoreRecord`]s.
//!
//! ```rust
//! use docsift::{Pipeline, PipelineConfig};
//! use serde_json::json;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), None).unwrap();
//! let records = pipeline
//!     .run(vec![
//!         json!({"id": 1, "text": "我 爱 北京 天安门"}),
//!         json!({"id": 2, "text": "今天 天气 很好"}),
//!     ])
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].fields["chars_dupe_2grams"], 0.0);
//! ```

pub use exact::{
    BloomFilter, DedupPosition, DedupReport, ExactDedupConfig, ExactDedupFilter, ExactError,
};
pub use language::{Detection, LanguageConfig, LanguageError, LanguageIdentifier};
pub use ngram::{EmptyPolicy, NgramConfig, NgramError, NgramStats};
pub use signature::{
    Signature, SignatureConfig, SignatureError, SignatureIndex, ThresholdMatches, minhash_signature,
};
pub use tokenize::{Segmentation, TokenSet, TokenizeConfig, TokenizeError, Tokenizer};
pub use wordgram::{
    CorpusFile, ImportanceScorer, ModelSpec, WordgramConfig, WordgramError, WordgramModel,
};

pub mod config;
pub mod document;
pub mod executor;
pub mod merge;
pub mod pipeline;

pub use crate::config::{ConfigLoadError, PipelineConfig, StageToggles};
pub use crate::document::{DocId, Document, FieldNames, validate_batch};
pub use crate::executor::{ExecutionStrategy, ParallelExecutor, gather};
pub use crate::merge::{MergeMode, Partial, ScoreRecord, merge};
pub use crate::pipeline::Pipeline;

use thiserror::Error;

/// Errors that can occur while running a batch through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A record is malformed. Raised before any processing starts.
    #[error("record {index}: field '{field}': {reason}")]
    Validation {
        index: usize,
        field: String,
        reason: String,
    },

    /// The input document is not a JSON array of records.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("tokenize failure: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("n-gram stage failure: {0}")]
    Ngram(#[from] NgramError),

    #[error("importance stage failure: {0}")]
    Wordgram(#[from] WordgramError),

    #[error("signature stage failure: {0}")]
    Signature(#[from] SignatureError),

    #[error("exact dedup failure: {0}")]
    Exact(#[from] ExactError),

    #[error("language stage failure: {0}")]
    Language(#[from] LanguageError),

    /// A worker returned an error or panicked; the whole batch is aborted.
    #[error("worker failed on document {index}: {reason}")]
    WorkerFailure { index: usize, reason: String },

    /// The worker pool could not be started.
    #[error("executor setup failed: {0}")]
    Executor(String),

    #[error("merge conflict on key '{key}'")]
    MergeConflict { key: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
