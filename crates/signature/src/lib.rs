//! MinHash signatures and multi-threshold LSH for near-duplicate detection.
//!
//! ## Pipeline
//!
//! 1. Hash every unique token once (SHA-256 prefix).
//! 2. Build a fixed-length MinHash signature from a seeded permutation
//!    family ([`minhash_signature`]). Pure and parallel-safe per document.
//! 3. Insert all signatures into a [`SignatureIndex`] on one thread. The
//!    index keeps one banded [`LshIndex`] per threshold, with bands and rows
//!    chosen by [`optimal_params`] from the configured false-positive and
//!    false-negative weights. The default weights lean hard on recall.
//! 4. [`seal`](SignatureIndex::seal), then query each document for the other
//!    documents sharing at least one band.
//!
//! Candidate sets are probabilistic: a pair above a threshold is found with
//! high probability, not certainty.
//!
//! ```rust
//! use signature::{minhash_signature, SignatureConfig, SignatureIndex};
//!
//! let cfg = SignatureConfig::default();
//! let mut index = SignatureIndex::build(&cfg).unwrap();
//! let doc = ["北京", "故宫", "长城"];
//! index.insert("a", minhash_signature(doc, &cfg).unwrap()).unwrap();
//! index.insert("b", minhash_signature(doc, &cfg).unwrap()).unwrap();
//! index.seal();
//!
//! let results = index.query(&"a").unwrap();
//! assert_eq!(results[0].field_name(), "signature_sim0.7");
//! assert_eq!(results[0].matches, vec!["b"]);
//! ```

mod config;
mod index;
mod lsh;
mod minhash;
mod params;

pub use crate::config::{SignatureConfig, SignatureError};
pub use crate::index::{field_name, SignatureIndex, ThresholdMatches};
pub use crate::lsh::LshIndex;
pub use crate::minhash::{minhash_signature, token_hash, Signature};
pub use crate::params::{
    candidate_probability, false_negative_area, false_positive_area, optimal_params,
};
