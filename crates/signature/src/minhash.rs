//! MinHash signatures over unique-token sets.
//!
//! Tokens are hashed once with SHA-256 (first 8 bytes, little endian).
//! Slot `j` then applies its own permutation, keyed by
//! `splitmix64(seed + j * GOLDEN)`, and keeps the minimum over all tokens.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{SignatureConfig, SignatureError};

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Fixed-length MinHash signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(Vec<u64>);

impl Signature {
    pub fn from_values(values: Vec<u64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Estimated Jaccard similarity: the share of equal slots.
    ///
    /// Signatures of different length compare as `0.0`.
    pub fn jaccard(&self, other: &Signature) -> f64 {
        if self.0.is_empty() || self.0.len() != other.0.len() {
            return 0.0;
        }
        let equal = self
            .0
            .iter()
            .zip(&other.0)
            .filter(|(a, b)| a == b)
            .count();
        equal as f64 / self.0.len() as f64
    }
}

/// 64-bit token hash: the first 8 bytes of SHA-256, little endian.
pub fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Compute the MinHash signature of a unique-token set.
///
/// Duplicate tokens in the input do not change the result. An empty set
/// has no meaningful signature and is rejected.
pub fn minhash_signature<I, S>(
    unique_tokens: I,
    cfg: &SignatureConfig,
) -> Result<Signature, SignatureError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let hashes: Vec<u64> = unique_tokens
        .into_iter()
        .map(|t| token_hash(t.as_ref()))
        .collect();
    if hashes.is_empty() {
        return Err(SignatureError::EmptyTokenSet);
    }
    Ok(Signature(signature_from_hashes(
        &hashes,
        cfg.num_perm,
        cfg.seed,
        cfg.use_parallel,
    )))
}

pub(crate) fn signature_from_hashes(
    hashes: &[u64],
    num_perm: usize,
    seed: u64,
    use_parallel: bool,
) -> Vec<u64> {
    let mut result = Vec::with_capacity(num_perm);
    if use_parallel {
        (0..num_perm)
            .into_par_iter()
            .map(|j| compute_slot(hashes, j, seed))
            .collect_into_vec(&mut result);
    } else {
        result.extend((0..num_perm).map(|j| compute_slot(hashes, j, seed)));
    }
    result
}

/// Minimum over `hashes` of the slot-`j` permutation.
#[inline]
pub(crate) fn compute_slot(hashes: &[u64], j: usize, seed: u64) -> u64 {
    let key = splitmix64(seed.wrapping_add((j as u64).wrapping_mul(GOLDEN)));
    hashes
        .iter()
        .map(|&h| splitmix64(h ^ key))
        .min()
        .unwrap_or(u64::MAX)
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(GOLDEN);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
