//! YAML configuration for the docsift pipeline.
//!
//! One file configures every stage. Each section is optional and falls back
//! to the stage crate's defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "zh-web batch"
//!
//! fields:
//!   text: "text"
//!   id: "id"
//!
//! execution:
//!   strategy: parallel
//!   num_workers: 8
//!
//! tokenize:
//!   segmentation: whitespace
//!   extra_stopwords: ["嗯"]
//!
//! ngram:
//!   max_dupe_n: 10
//!   max_top_n: 4
//!   empty_policy: zero
//!
//! importance:
//!   orders: [2, 3]
//!   model_dir: "models/"
//!   corpora:
//!     - name: wiki
//!       file_path: "corpora/wiki.json"
//!
//! signature:
//!   num_perm: 128
//!   thresholds: [0.7, 0.8, 0.9]
//!
//! language:
//!   allowlist: ["cmn", "eng"]
//!
//! exact_dedup:
//!   enabled: true
//!   expected_items: 500000
//!   false_positive_rate: 0.01
//!   position: before_scoring
//!
//! stages:
//!   ngram: true
//!   importance: true
//!   signature: true
//!   language: true
//!
//! merge: last_write_wins
//! ```

use std::fs;
use std::path::Path;

use exact::ExactDedupConfig;
use language::LanguageConfig;
use ngram::NgramConfig;
use serde::{Deserialize, Serialize};
use signature::SignatureConfig;
use thiserror::Error;
use tokenize::TokenizeConfig;
use wordgram::WordgramConfig;

use crate::document::FieldNames;
use crate::executor::ExecutionStrategy;
use crate::merge::MergeMode;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Per-stage switches. Exact dedup is switched by its own section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StageToggles {
    pub ngram: bool,
    pub importance: bool,
    pub signature: bool,
    pub language: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            ngram: true,
            importance: true,
            signature: true,
            language: true,
        }
    }
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Record keys holding the text and the identifier
    #[serde(default)]
    pub fields: FieldNames,

    #[serde(default)]
    pub execution: ExecutionStrategy,

    #[serde(default)]
    pub tokenize: TokenizeConfig,

    #[serde(default)]
    pub ngram: NgramConfig,

    /// Reference corpora or persisted models for importance scoring
    #[serde(default)]
    pub importance: WordgramConfig,

    #[serde(default)]
    pub signature: SignatureConfig,

    /// Language-identification detector options
    #[serde(default)]
    pub language: LanguageConfig,

    #[serde(default)]
    pub exact_dedup: ExactDedupConfig,

    #[serde(default)]
    pub stages: StageToggles,

    /// Collision policy when merging partial results
    #[serde(default)]
    pub merge: MergeMode,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.fields.text.is_empty() || self.fields.id.is_empty() {
            return Err(ConfigLoadError::Validation(
                "fields.text and fields.id must be non-empty".into(),
            ));
        }
        if self.fields.text == self.fields.id {
            return Err(ConfigLoadError::Validation(format!(
                "fields.text and fields.id must differ (both '{}')",
                self.fields.text
            )));
        }

        self.execution.validate().map_err(ConfigLoadError::Validation)?;
        self.tokenize.validate().map_err(stage_error("tokenize"))?;
        self.ngram.validate().map_err(stage_error("ngram"))?;
        self.importance.validate().map_err(stage_error("importance"))?;
        self.signature.validate().map_err(stage_error("signature"))?;
        self.language.validate().map_err(stage_error("language"))?;
        self.exact_dedup.validate().map_err(stage_error("exact_dedup"))?;

        Ok(())
    }
}

fn stage_error<E: std::fmt::Display>(section: &'static str) -> impl Fn(E) -> ConfigLoadError {
    move |err| ConfigLoadError::Validation(format!("{section}: {err}"))
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            fields: FieldNames::default(),
            execution: ExecutionStrategy::default(),
            tokenize: TokenizeConfig::default(),
            ngram: NgramConfig::default(),
            importance: WordgramConfig::default(),
            signature: SignatureConfig::default(),
            language: LanguageConfig::default(),
            exact_dedup: ExactDedupConfig::default(),
            stages: StageToggles::default(),
            merge: MergeMode::default(),
        }
    }
}
