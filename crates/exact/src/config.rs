use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the exact-dedup pass runs relative to scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupPosition {
    /// Drop duplicates before any metric is computed.
    #[default]
    BeforeScoring,
    /// Score everything, then drop duplicates from the merged output.
    AfterScoring,
}

/// Configuration for the streaming exact-duplicate filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExactDedupConfig {
    pub enabled: bool,
    /// Item count the Bloom filter is sized for.
    pub expected_items: usize,
    /// Target false-positive probability at `expected_items`.
    pub false_positive_rate: f64,
    pub position: DedupPosition,
}

impl Default for ExactDedupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expected_items: 500_000,
            false_positive_rate: 0.01,
            position: DedupPosition::BeforeScoring,
        }
    }
}

impl ExactDedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_expected_items(mut self, expected_items: usize) -> Self {
        self.expected_items = expected_items;
        self
    }

    pub fn with_false_positive_rate(mut self, rate: f64) -> Self {
        self.false_positive_rate = rate;
        self
    }

    pub fn with_position(mut self, position: DedupPosition) -> Self {
        self.position = position;
        self
    }

    pub fn validate(&self) -> Result<(), ExactError> {
        if self.expected_items == 0 {
            return Err(ExactError::InvalidConfig(
                "expected_items must be > 0".into(),
            ));
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(ExactError::InvalidConfig(format!(
                "false_positive_rate must be in (0, 1) (got {})",
                self.false_positive_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExactError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ExactDedupConfig::default();
        assert!(!cfg.enabled);
        assert_eq!(cfg.expected_items, 500_000);
        assert_eq!(cfg.false_positive_rate, 0.01);
        assert_eq!(cfg.position, DedupPosition::BeforeScoring);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_sizing_rejected() {
        assert!(ExactDedupConfig::new().with_expected_items(0).validate().is_err());
        for p in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(ExactDedupConfig::new()
                .with_false_positive_rate(p)
                .validate()
                .is_err());
        }
    }

    #[test]
    fn position_parses_snake_case() {
        let pos: DedupPosition = serde_json::from_str("\"after_scoring\"").unwrap();
        assert_eq!(pos, DedupPosition::AfterScoring);
    }
}
