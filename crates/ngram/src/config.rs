//! Configuration and error types for n-gram statistics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a ratio, mean or entropy computation does when its denominator is
/// an empty token sequence.
///
/// The policy is applied uniformly: every such computation in this crate
/// (and in the wordgram scorer) honors the same setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    /// Report `0.0`.
    #[default]
    Zero,
    /// Return [`NgramError::EmptyInput`].
    Fail,
}

/// Configuration for the n-gram statistics engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NgramConfig {
    /// Configuration schema version. Must be >= 1.
    pub version: u32,
    /// Largest n for the duplicate-n-gram character ratio.
    pub max_dupe_n: usize,
    /// Largest n for the top-n-gram character ratio.
    pub max_top_n: usize,
    /// Empty-input policy.
    pub empty_policy: EmptyPolicy,
}

impl NgramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn with_max_dupe_n(mut self, n: usize) -> Self {
        self.max_dupe_n = n;
        self
    }

    pub fn with_max_top_n(mut self, n: usize) -> Self {
        self.max_top_n = n;
        self
    }

    pub fn validate(&self) -> Result<(), NgramError> {
        if self.version < 1 {
            return Err(NgramError::InvalidConfig(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        if self.max_dupe_n < 2 {
            return Err(NgramError::InvalidConfig(format!(
                "max_dupe_n must be >= 2 (got {})",
                self.max_dupe_n
            )));
        }
        if self.max_top_n < 2 || self.max_top_n > self.max_dupe_n {
            return Err(NgramError::InvalidConfig(format!(
                "max_top_n must be in 2..={} (got {})",
                self.max_dupe_n, self.max_top_n
            )));
        }
        Ok(())
    }
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            version: 1,
            max_dupe_n: 10,
            max_top_n: 4,
            empty_policy: EmptyPolicy::Zero,
        }
    }
}

/// Errors returned by the n-gram statistics engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NgramError {
    #[error("empty token sequence passed to {metric}")]
    EmptyInput { metric: &'static str },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_feature_set() {
        let cfg = NgramConfig::default();
        assert_eq!(cfg.max_dupe_n, 10);
        assert_eq!(cfg.max_top_n, 4);
        assert_eq!(cfg.empty_policy, EmptyPolicy::Zero);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn top_n_above_dupe_n_rejected() {
        let cfg = NgramConfig::default().with_max_dupe_n(3).with_max_top_n(4);
        assert!(matches!(cfg.validate(), Err(NgramError::InvalidConfig(_))));
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&EmptyPolicy::Fail).unwrap();
        assert_eq!(json, "\"fail\"");
    }
}
