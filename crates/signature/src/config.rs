//! Configuration and error types for the signature index.
//!
//! Signatures are a pure function of `(unique tokens, config)`: two runs
//! sharing a config produce bit-identical signatures and candidate sets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for MinHash signatures and the per-threshold LSH indexes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignatureConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter a signature must bump this version.
    pub version: u32,
    /// Signature length. Fixed for the whole run.
    pub num_perm: usize,
    /// Jaccard thresholds, one LSH index each.
    pub thresholds: Vec<f64>,
    /// Seed of the hash family.
    pub seed: u64,
    /// `(false_positive, false_negative)` weights for band/row selection.
    ///
    /// Must sum to 1. Heavier false-negative weight buys recall with more
    /// bands of fewer rows.
    pub weights: (f64, f64),
    /// Compute signature slots on the rayon pool.
    pub use_parallel: bool,
}

impl SignatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the seed. Equal seeds give equal signatures.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_weights(mut self, false_positive: f64, false_negative: f64) -> Self {
        self.weights = (false_positive, false_negative);
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.version < 1 {
            return Err(SignatureError::InvalidConfig(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        if self.num_perm < 2 {
            return Err(SignatureError::InvalidConfig(format!(
                "num_perm must be >= 2 (got {})",
                self.num_perm
            )));
        }
        let (fp, fn_) = self.weights;
        if !((0.0..=1.0).contains(&fp) && (0.0..=1.0).contains(&fn_))
            || (fp + fn_ - 1.0).abs() > 1e-9
        {
            return Err(SignatureError::InvalidConfig(format!(
                "weights ({fp}, {fn_}) must lie in [0, 1] and sum to 1"
            )));
        }
        if self.thresholds.is_empty() {
            return Err(SignatureError::InvalidConfig(
                "at least one threshold is required".into(),
            ));
        }
        for (i, &t) in self.thresholds.iter().enumerate() {
            if !(t > 0.0 && t <= 1.0) {
                return Err(SignatureError::InvalidConfig(format!(
                    "threshold {t} is outside (0, 1]"
                )));
            }
            if self.thresholds[..i].contains(&t) {
                return Err(SignatureError::InvalidConfig(format!(
                    "threshold {t} listed twice"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            version: 1,
            num_perm: 128,
            thresholds: vec![0.7, 0.8, 0.9],
            seed: 0xF00D_BAAD_F00D_BAAD,
            weights: (0.001, 0.999),
            use_parallel: false,
        }
    }
}

/// Errors returned by signature computation and the LSH index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("cannot sign an empty token set")]
    EmptyTokenSet,

    #[error("document {id} is already indexed")]
    DuplicateId { id: String },

    #[error("signature has {actual} slots, index expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("index is sealed; no further inserts")]
    Sealed,

    #[error("index must be sealed before querying")]
    NotSealed,

    #[error("document {id} is not indexed")]
    UnknownId { id: String },

    #[error("threshold {threshold} is not configured")]
    UnknownThreshold { threshold: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
