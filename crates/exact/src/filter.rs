use serde::Serialize;
use tracing::{info, warn};

use crate::bloom::BloomFilter;
use crate::config::{ExactDedupConfig, ExactError};

/// Outcome of one filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub kept: usize,
    pub dropped: usize,
}

/// First-occurrence-wins duplicate suppression over a Bloom filter.
///
/// Items must be offered in input order: whichever copy is seen first is
/// kept. A false positive drops a genuinely unique item at roughly the
/// configured rate.
#[derive(Debug, Clone)]
pub struct ExactDedupFilter {
    bloom: BloomFilter,
    capacity_exceeded: bool,
}

impl ExactDedupFilter {
    pub fn new(cfg: &ExactDedupConfig) -> Result<Self, ExactError> {
        cfg.validate()?;
        Ok(Self {
            bloom: BloomFilter::with_capacity(cfg.expected_items, cfg.false_positive_rate),
            capacity_exceeded: false,
        })
    }

    /// `true` if `key` is new (and now recorded), `false` for a probable
    /// duplicate.
    pub fn check_and_insert(&mut self, key: &str) -> bool {
        let fresh = self.bloom.insert(key.as_bytes());
        if fresh && self.bloom.len() > self.bloom.capacity() && !self.capacity_exceeded {
            self.capacity_exceeded = true;
            warn!(
                capacity = self.bloom.capacity(),
                estimated_fp_rate = self.bloom.estimated_fp_rate(),
                "exact-dedup filter exceeded its sized capacity; false-positive rate will degrade"
            );
        }
        fresh
    }

    /// Keep the first occurrence of each key, preserving input order.
    pub fn filter<T, F>(&mut self, items: Vec<T>, key_fn: F) -> (Vec<T>, DedupReport)
    where
        F: Fn(&T) -> &str,
    {
        let total = items.len();
        let kept: Vec<T> = items
            .into_iter()
            .filter(|item| self.check_and_insert(key_fn(item)))
            .collect();
        let report = DedupReport {
            kept: kept.len(),
            dropped: total - kept.len(),
        };
        info!(kept = report.kept, dropped = report.dropped, "exact dedup pass");
        (kept, report)
    }

    /// Whether more distinct keys than `expected_items` have been seen.
    pub fn capacity_exceeded(&self) -> bool {
        self.capacity_exceeded
    }

    pub fn bloom(&self) -> &BloomFilter {
        &self.bloom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ExactDedupFilter {
        ExactDedupFilter::new(&ExactDedupConfig::default().with_enabled(true)).unwrap()
    }

    #[test]
    fn first_occurrence_retained_in_order() {
        let items = vec!["我 爱 北京 天安门", "我 爱 北京 故宫", "我 爱 北京 天安门"];
        let (kept, report) = filter().filter(items, |s| *s);
        assert_eq!(kept, vec!["我 爱 北京 天安门", "我 爱 北京 故宫"]);
        assert_eq!(report, DedupReport { kept: 2, dropped: 1 });
    }

    #[test]
    fn keyed_by_projection() {
        let items = vec![(1, "x".to_string()), (2, "y".to_string()), (3, "x".to_string())];
        let (kept, _) = filter().filter(items, |(_, text)| text.as_str());
        let ids: Vec<i32> = kept.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn state_persists_across_calls() {
        let mut f = filter();
        let (first, _) = f.filter(vec!["a", "b"], |s| *s);
        let (second, report) = f.filter(vec!["b", "c"], |s| *s);
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(second, vec!["c"]);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn overflow_is_soft() {
        let cfg = ExactDedupConfig::default().with_expected_items(4);
        let mut f = ExactDedupFilter::new(&cfg).unwrap();
        let items: Vec<String> = (0..8).map(|i| format!("item-{i}")).collect();
        let (kept, _) = f.filter(items, |s| s.as_str());
        assert!(f.capacity_exceeded());
        // still operating; most unique items survive an undersized filter
        assert!(kept.len() >= 5);
    }

    #[test]
    fn within_capacity_no_warning() {
        let mut f = filter();
        f.check_and_insert("only");
        assert!(!f.capacity_exceeded());
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = ExactDedupConfig::default().with_false_positive_rate(2.0);
        assert!(matches!(
            ExactDedupFilter::new(&cfg),
            Err(ExactError::InvalidConfig(_))
        ));
    }
}
