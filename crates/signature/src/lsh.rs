//! Banded LSH over MinHash signatures, one instance per threshold.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::minhash::Signature;
use crate::params::optimal_params;

/// LSH buckets for a single Jaccard threshold.
///
/// Documents are addressed by their dense insertion index. Insert-only:
/// there is no removal and the band layout never changes.
#[derive(Debug, Clone)]
pub struct LshIndex {
    threshold: f64,
    bands: usize,
    rows: usize,
    buckets: Vec<HashMap<u64, Vec<usize>>>,
}

impl LshIndex {
    /// Buckets tuned for `threshold` over signatures of `num_perm` slots.
    pub fn new(threshold: f64, num_perm: usize, weights: (f64, f64)) -> Self {
        let (bands, rows) = optimal_params(threshold, num_perm, weights);
        Self::with_params(threshold, bands, rows)
    }

    pub fn with_params(threshold: f64, bands: usize, rows: usize) -> Self {
        Self {
            threshold,
            bands,
            rows,
            buckets: (0..bands).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn band_keys<'a>(&'a self, signature: &'a Signature) -> impl Iterator<Item = u64> + 'a {
        signature
            .values()
            .chunks_exact(self.rows)
            .take(self.bands)
            .map(hash_band)
    }

    pub fn insert(&mut self, doc: usize, signature: &Signature) {
        let keys: Vec<u64> = self.band_keys(signature).collect();
        for (band, key) in keys.into_iter().enumerate() {
            self.buckets[band].entry(key).or_default().push(doc);
        }
    }

    /// Every document sharing at least one band with `signature`.
    pub fn query(&self, signature: &Signature) -> BTreeSet<usize> {
        let mut candidates = BTreeSet::new();
        for (band, key) in self.band_keys(signature).enumerate() {
            if let Some(docs) = self.buckets[band].get(&key) {
                candidates.extend(docs.iter().copied());
            }
        }
        candidates
    }
}

fn hash_band(values: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    xxh3_64(&bytes)
}
