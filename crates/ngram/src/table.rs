//! n-gram frequency tables.

use std::hash::Hash;

use fxhash::FxHashMap;

/// Occurrence counts of the n-grams of one token sequence, for one n.
///
/// Entries are kept in first-occurrence order, which makes iteration and
/// tie-breaking deterministic.
#[derive(Debug, Clone)]
pub struct NgramTable<'a, S> {
    n: usize,
    index: FxHashMap<&'a [S], usize>,
    entries: Vec<(&'a [S], usize)>,
    total: usize,
}

impl<'a, S: Hash + Eq> NgramTable<'a, S> {
    /// Count every contiguous window of `n` tokens.
    ///
    /// `n == 0` or a sequence shorter than `n` yields an empty table.
    pub fn build(tokens: &'a [S], n: usize) -> Self {
        let mut table = Self {
            n,
            index: FxHashMap::default(),
            entries: Vec::new(),
            total: 0,
        };
        if n == 0 || tokens.len() < n {
            return table;
        }
        for window in tokens.windows(n) {
            match table.index.get(window) {
                Some(&slot) => table.entries[slot].1 += 1,
                None => {
                    table.index.insert(window, table.entries.len());
                    table.entries.push((window, 1));
                }
            }
            table.total += 1;
        }
        table
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Occurrences of `ngram`, zero when unseen.
    pub fn count(&self, ngram: &[S]) -> usize {
        self.index
            .get(ngram)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    /// Total number of windows counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct n-grams.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most frequent n-gram; ties go to the one seen first.
    pub fn most_frequent(&self) -> Option<(&'a [S], usize)> {
        let mut best: Option<(&'a [S], usize)> = None;
        for &(gram, count) in &self.entries {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((gram, count));
            }
        }
        best
    }

    /// Iterate `(ngram, count)` in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a [S], usize)> + '_ {
        self.entries.iter().copied()
    }
}
