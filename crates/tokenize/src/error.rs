use thiserror::Error;

/// Errors that can occur while building a tokenizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
