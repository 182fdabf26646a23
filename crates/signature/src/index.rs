use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::HashMap;
use serde::Serialize;
use tracing::debug;

use crate::config::{SignatureConfig, SignatureError};
use crate::lsh::LshIndex;
use crate::minhash::Signature;

/// Candidates of one document at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdMatches<Id> {
    pub threshold: f64,
    /// Other documents sharing a band, ascending.
    pub matches: Vec<Id>,
}

impl<Id> ThresholdMatches<Id> {
    /// Record key of these matches, e.g. `signature_sim0.7`.
    pub fn field_name(&self) -> String {
        field_name(self.threshold)
    }
}

/// Record key of the matches at `threshold`.
pub fn field_name(threshold: f64) -> String {
    format!("signature_sim{threshold}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Building,
    Sealed,
}

/// Near-duplicate index with one LSH structure per configured threshold.
///
/// Two phases: inserts, then [`seal`](SignatureIndex::seal), then queries.
/// Inserts take `&mut self` and run on one thread; once sealed the index
/// is only read.
#[derive(Debug)]
pub struct SignatureIndex<Id> {
    num_perm: usize,
    ids: Vec<Id>,
    positions: HashMap<Id, usize>,
    signatures: Vec<Signature>,
    lsh: Vec<LshIndex>,
    phase: Phase,
}

impl<Id> SignatureIndex<Id>
where
    Id: Clone + Ord + Hash + Debug,
{
    pub fn build(cfg: &SignatureConfig) -> Result<Self, SignatureError> {
        cfg.validate()?;
        let lsh: Vec<LshIndex> = cfg
            .thresholds
            .iter()
            .map(|&t| LshIndex::new(t, cfg.num_perm, cfg.weights))
            .collect();
        for index in &lsh {
            debug!(
                threshold = index.threshold(),
                bands = index.bands(),
                rows = index.rows(),
                "lsh parameters"
            );
        }
        Ok(Self {
            num_perm: cfg.num_perm,
            ids: Vec::new(),
            positions: HashMap::new(),
            signatures: Vec::new(),
            lsh,
            phase: Phase::Building,
        })
    }

    pub fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        self.lsh.iter().map(LshIndex::threshold)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.phase == Phase::Sealed
    }

    pub fn insert(&mut self, id: Id, signature: Signature) -> Result<(), SignatureError> {
        if self.phase == Phase::Sealed {
            return Err(SignatureError::Sealed);
        }
        if signature.len() != self.num_perm {
            return Err(SignatureError::LengthMismatch {
                expected: self.num_perm,
                actual: signature.len(),
            });
        }
        if self.positions.contains_key(&id) {
            return Err(SignatureError::DuplicateId {
                id: format!("{id:?}"),
            });
        }
        let doc = self.ids.len();
        for lsh in &mut self.lsh {
            lsh.insert(doc, &signature);
        }
        self.positions.insert(id.clone(), doc);
        self.ids.push(id);
        self.signatures.push(signature);
        Ok(())
    }

    /// End the insertion phase. Idempotent.
    pub fn seal(&mut self) {
        self.phase = Phase::Sealed;
    }

    fn position(&self, id: &Id) -> Result<usize, SignatureError> {
        if self.phase != Phase::Sealed {
            return Err(SignatureError::NotSealed);
        }
        self.positions
            .get(id)
            .copied()
            .ok_or_else(|| SignatureError::UnknownId {
                id: format!("{id:?}"),
            })
    }

    fn candidates(&self, lsh: &LshIndex, doc: usize) -> Vec<Id> {
        let mut matches: Vec<Id> = lsh
            .query(&self.signatures[doc])
            .into_iter()
            .filter(|&other| other != doc)
            .map(|other| self.ids[other].clone())
            .collect();
        matches.sort();
        matches
    }

    /// Candidates of `id` at every threshold, in configuration order.
    pub fn query(&self, id: &Id) -> Result<Vec<ThresholdMatches<Id>>, SignatureError> {
        let doc = self.position(id)?;
        Ok(self
            .lsh
            .iter()
            .map(|lsh| ThresholdMatches {
                threshold: lsh.threshold(),
                matches: self.candidates(lsh, doc),
            })
            .collect())
    }

    /// Candidates of `id` at one configured threshold.
    pub fn query_threshold(&self, id: &Id, threshold: f64) -> Result<Vec<Id>, SignatureError> {
        let doc = self.position(id)?;
        let lsh = self
            .lsh
            .iter()
            .find(|lsh| lsh.threshold() == threshold)
            .ok_or_else(|| SignatureError::UnknownThreshold {
                threshold: threshold.to_string(),
            })?;
        Ok(self.candidates(lsh, doc))
    }

    /// Estimated Jaccard similarity of two indexed documents.
    pub fn jaccard(&self, a: &Id, b: &Id) -> Result<f64, SignatureError> {
        let a = self.position(a)?;
        let b = self.position(b)?;
        Ok(self.signatures[a].jaccard(&self.signatures[b]))
    }
}
