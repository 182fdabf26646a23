use serde::{Deserialize, Serialize};
use thiserror::Error;
use whatlang::Lang;

/// Configuration for the language-identification stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageConfig {
    pub version: u32,
    /// ISO 639-3 codes the detector may answer with. Empty allows every
    /// supported language.
    pub allowlist: Vec<String>,
    /// Lowercase text before detection.
    pub lowercase: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            version: 1,
            allowlist: Vec::new(),
            lowercase: true,
        }
    }
}

impl LanguageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowlist<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlist = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn validate(&self) -> Result<(), LanguageError> {
        if self.version < 1 {
            return Err(LanguageError::InvalidConfig(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        self.allowed_languages().map(|_| ())
    }

    /// The allowlist resolved to detector languages.
    pub(crate) fn allowed_languages(&self) -> Result<Vec<Lang>, LanguageError> {
        self.allowlist
            .iter()
            .map(|code| {
                Lang::from_code(code.as_str())
                    .ok_or_else(|| LanguageError::UnknownLanguage { code: code.clone() })
            })
            .collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("unknown language code '{code}'")]
    UnknownLanguage { code: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
