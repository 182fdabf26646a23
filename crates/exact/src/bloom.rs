use std::f64::consts::LN_2;

use xxhash_rust::xxh3::xxh3_64_with_seed;

const SEED_PRIMARY: u64 = 0x51_7C_C1_B7_27_22_0A_95;
const SEED_SECONDARY: u64 = 0x2545_F491_4F6C_DD1D;

/// Insert-only Bloom filter sized for an expected item count and target
/// false-positive rate.
///
/// Bit positions come from double hashing `h1 + i * h2 (mod m)` over two
/// seeded xxh3 hashes. The bit array never grows; inserting past capacity
/// keeps working at a degraded false-positive rate.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
    capacity: usize,
    len: usize,
}

impl BloomFilter {
    /// `m = ceil(-N ln p / ln^2 2)` bits and `k = max(1, round(m / N * ln 2))`
    /// hash functions.
    ///
    /// Callers validate `expected_items > 0` and `0 < p < 1`; degenerate
    /// values are clamped to a one-bit, one-hash filter.
    pub fn with_capacity(expected_items: usize, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1) as f64;
        let m = (-n * false_positive_rate.ln() / (LN_2 * LN_2)).ceil();
        let num_bits = if m.is_finite() && m >= 1.0 { m as u64 } else { 1 };
        let k = ((num_bits as f64 / n) * LN_2).round().max(1.0) as u32;
        let words = num_bits.div_ceil(64) as usize;
        Self {
            bits: vec![0; words],
            num_bits,
            num_hashes: k,
            capacity: expected_items,
            len: 0,
        }
    }

    fn positions(&self, item: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let h1 = xxh3_64_with_seed(item, SEED_PRIMARY);
        let h2 = xxh3_64_with_seed(item, SEED_SECONDARY) | 1;
        (0..u64::from(self.num_hashes))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits)
    }

    fn bit(&self, pos: u64) -> bool {
        self.bits[(pos / 64) as usize] & (1u64 << (pos % 64)) != 0
    }

    /// Whether `item` was probably inserted before. Never a false negative.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.positions(item).all(|pos| self.bit(pos))
    }

    /// Add `item`. Returns `true` when it was not already (probably) present.
    pub fn insert(&mut self, item: &[u8]) -> bool {
        let positions: Vec<u64> = self.positions(item).collect();
        let mut fresh = false;
        for pos in positions {
            let word = &mut self.bits[(pos / 64) as usize];
            let mask = 1u64 << (pos % 64);
            if *word & mask == 0 {
                *word |= mask;
                fresh = true;
            }
        }
        if fresh {
            self.len += 1;
        }
        fresh
    }

    /// Number of items inserted as new.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Expected item count the filter was sized for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// `(1 - e^(-k n / m))^k` at the current fill.
    pub fn estimated_fp_rate(&self) -> f64 {
        let k = f64::from(self.num_hashes);
        let exponent = -k * self.len as f64 / self.num_bits as f64;
        (1.0 - exponent.exp()).powf(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_matches_formula() {
        let filter = BloomFilter::with_capacity(500_000, 0.01);
        // -500000 * ln(0.01) / ln(2)^2 = 4792529.19
        assert_eq!(filter.num_bits(), 4_792_530);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.capacity(), 500_000);
    }

    #[test]
    fn inserted_items_are_found() {
        let mut filter = BloomFilter::with_capacity(1000, 0.01);
        for i in 0..1000 {
            filter.insert(format!("doc-{i}").as_bytes());
        }
        for i in 0..1000 {
            assert!(filter.contains(format!("doc-{i}").as_bytes()));
        }
    }

    #[test]
    fn second_insert_reports_duplicate() {
        let mut filter = BloomFilter::with_capacity(10, 0.01);
        assert!(filter.insert("我 爱 北京".as_bytes()));
        assert!(!filter.insert("我 爱 北京".as_bytes()));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn false_positive_rate_near_target() {
        let mut filter = BloomFilter::with_capacity(10_000, 0.01);
        for i in 0..10_000 {
            filter.insert(format!("in-{i}").as_bytes());
        }
        let false_positives = (0..10_000)
            .filter(|i| filter.contains(format!("out-{i}").as_bytes()))
            .count();
        // target 1%; allow generous slack
        assert!(false_positives < 300, "{false_positives} false positives");
        assert!(filter.estimated_fp_rate() < 0.02);
    }

    #[test]
    fn empty_filter_contains_nothing() {
        let filter = BloomFilter::with_capacity(100, 0.01);
        assert!(filter.is_empty());
        assert!(!filter.contains(b"anything"));
        assert_eq!(filter.estimated_fp_rate(), 0.0);
    }
}
