use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use whatlang::{Detector, Lang};

use crate::config::{LanguageConfig, LanguageError};

/// Code reported when no language can be detected.
pub const UNDETERMINED: &str = "und";

/// Detected language of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// ISO 639-3 code, or [`UNDETERMINED`].
    pub language: String,
    /// Detector confidence, clamped to `[0, 1]` and rounded to 4 decimals.
    pub prop: f64,
}

impl Detection {
    fn undetermined() -> Self {
        Self {
            language: UNDETERMINED.to_string(),
            prop: 0.0,
        }
    }

    /// The `language` / `prop` partial merged into the output record.
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("language".to_string(), Value::from(self.language)),
            ("prop".to_string(), Value::from(self.prop)),
        ])
    }
}

/// Read-only detector, shared by every worker.
pub struct LanguageIdentifier {
    detector: Detector,
    allowlist: Vec<Lang>,
    lowercase: bool,
}

impl fmt::Debug for LanguageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageIdentifier")
            .field("allowlist", &self.allowlist)
            .field("lowercase", &self.lowercase)
            .finish()
    }
}

impl LanguageIdentifier {
    pub fn new(cfg: &LanguageConfig) -> Result<Self, LanguageError> {
        cfg.validate()?;
        let allowlist = cfg.allowed_languages()?;
        let detector = if allowlist.is_empty() {
            Detector::new()
        } else {
            Detector::with_allowlist(allowlist.clone())
        };
        Ok(Self {
            detector,
            allowlist,
            lowercase: cfg.lowercase,
        })
    }

    /// Identify the language of `text`.
    ///
    /// Text is trimmed (and lowercased when configured) first. Empty or
    /// script-less text is [`UNDETERMINED`] with `prop == 0.0`.
    pub fn identify(&self, text: &str) -> Detection {
        let trimmed = text.trim();
        let prepared = if self.lowercase {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        match self.detector.detect(&prepared) {
            Some(info) => Detection {
                language: info.lang().code().to_string(),
                prop: round4(info.confidence().clamp(0.0, 1.0)),
            },
            None => Detection::undetermined(),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
