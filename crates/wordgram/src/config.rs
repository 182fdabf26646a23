use std::collections::BTreeSet;
use std::path::PathBuf;

use ngram::EmptyPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokenize::TokenizeError;

/// A reference corpus stored as a JSON array of objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusFile {
    pub name: String,
    pub file_path: PathBuf,
}

/// A persisted model to load instead of training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub model_path: PathBuf,
}

/// Configuration for building or loading importance models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordgramConfig {
    pub version: u32,
    /// n-gram orders trained per corpus.
    pub orders: Vec<usize>,
    pub empty_policy: EmptyPolicy,
    /// Field holding the text in corpus files.
    pub text_field: String,
    /// Where freshly trained models are written. `None` skips saving.
    pub model_dir: Option<PathBuf>,
    /// Reference corpora to train from.
    pub corpora: Vec<CorpusFile>,
    /// Persisted models. When non-empty, `corpora` is ignored.
    pub models: Vec<ModelSpec>,
}

impl Default for WordgramConfig {
    fn default() -> Self {
        Self {
            version: 1,
            orders: vec![2, 3],
            empty_policy: EmptyPolicy::Zero,
            text_field: "text".to_string(),
            model_dir: None,
            corpora: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl WordgramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(mut self, orders: Vec<usize>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(dir.into());
        self
    }

    pub fn with_corpora(mut self, corpora: Vec<CorpusFile>) -> Self {
        self.corpora = corpora;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelSpec>) -> Self {
        self.models = models;
        self
    }

    /// True when either models or corpora are configured.
    pub fn is_configured(&self) -> bool {
        !self.models.is_empty() || !self.corpora.is_empty()
    }

    pub fn validate(&self) -> Result<(), WordgramError> {
        if self.version < 1 {
            return Err(WordgramError::InvalidConfig(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        if self.orders.is_empty() || self.orders.contains(&0) {
            return Err(WordgramError::InvalidConfig(
                "orders must be non-empty and every order >= 1".into(),
            ));
        }
        if let Some(order) = first_repeat(self.orders.iter()) {
            return Err(WordgramError::InvalidConfig(format!(
                "order {order} listed twice"
            )));
        }
        if self.text_field.is_empty() {
            return Err(WordgramError::InvalidConfig(
                "text_field must not be empty".into(),
            ));
        }
        for name in self.corpora.iter().map(|c| &c.name) {
            check_model_name(name)?;
        }
        for name in self.models.iter().map(|m| &m.name) {
            check_model_name(name)?;
        }
        if let Some(name) = first_repeat(self.corpora.iter().map(|c| &c.name)) {
            return Err(WordgramError::DuplicateName { name: name.clone() });
        }
        if let Some(name) = first_repeat(self.models.iter().map(|m| &m.name)) {
            return Err(WordgramError::DuplicateName { name: name.clone() });
        }
        Ok(())
    }
}

/// Model and corpus names become file names under `model_dir`: they must be
/// a single plain path component.
pub(crate) fn check_model_name(name: &str) -> Result<(), WordgramError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\', '\0']) {
        Some("name contains a path separator or NUL")
    } else if name.starts_with('.') {
        Some("name starts with '.'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(WordgramError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn first_repeat<T: Ord, I: IntoIterator<Item = T>>(items: I) -> Option<T> {
    let mut seen = BTreeSet::new();
    items.into_iter().find_map(|item| {
        if seen.contains(&item) {
            Some(item)
        } else {
            seen.insert(item);
            None
        }
    })
}

/// Errors raised while building, persisting, loading or scoring models.
#[derive(Debug, Error)]
pub enum WordgramError {
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("failed to save model '{path}': {reason}")]
    ModelSave { path: String, reason: String },

    #[error("failed to read corpus '{path}': {reason}")]
    CorpusRead { path: String, reason: String },

    #[error("document has no {order}-gram windows to score against '{model}'")]
    EmptyInput { model: String, order: usize },

    #[error("either persisted models or reference corpora must be supplied")]
    NoModels,

    #[error("invalid model name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("model name '{name}' used twice")]
    DuplicateName { name: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trains_bigram_and_trigram() {
        let cfg = WordgramConfig::default();
        assert_eq!(cfg.orders, vec![2, 3]);
        assert!(cfg.validate().is_ok());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn names_that_escape_model_dir_rejected() {
        for name in ["../wiki", "a/b", "a\\b", "..", ".hidden", "", "nul\0"] {
            let cfg = WordgramConfig::default().with_corpora(vec![CorpusFile {
                name: name.to_string(),
                file_path: "wiki.json".into(),
            }]);
            assert!(
                matches!(cfg.validate(), Err(WordgramError::InvalidName { .. })),
                "{name:?} accepted"
            );
        }
        let cfg = WordgramConfig::default().with_models(vec![ModelSpec {
            name: "../../etc/passwd".into(),
            model_path: "m.wgm".into(),
        }]);
        assert!(matches!(cfg.validate(), Err(WordgramError::InvalidName { .. })));
    }

    #[test]
    fn plain_names_accepted() {
        for name in ["wiki", "wiki(2-gram)", "百科 2024", "a.b"] {
            assert!(check_model_name(name).is_ok(), "{name:?} rejected");
        }
    }

    #[test]
    fn repeated_names_and_orders_rejected() {
        let spec = ModelSpec {
            name: "wiki(2-gram)".into(),
            model_path: "a.wgm".into(),
        };
        let cfg = WordgramConfig::default().with_models(vec![spec.clone(), spec]);
        assert!(matches!(
            cfg.validate(),
            Err(WordgramError::DuplicateName { name }) if name == "wiki(2-gram)"
        ));
        let cfg = WordgramConfig::default().with_orders(vec![2, 3, 2]);
        assert!(matches!(cfg.validate(), Err(WordgramError::InvalidConfig(_))));
    }

    #[test]
    fn zero_order_rejected() {
        let cfg = WordgramConfig::default().with_orders(vec![0, 2]);
        assert!(matches!(
            cfg.validate(),
            Err(WordgramError::InvalidConfig(_))
        ));
    }
}
