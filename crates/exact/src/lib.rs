//! Streaming exact-duplicate suppression.
//!
//! Items are offered in input order; the first occurrence of each key is
//! kept and later copies are dropped. Membership lives in a fixed-size
//! [`BloomFilter`], so memory stays bounded and a small, configurable share
//! of unique items may be dropped as false positives.
//!
//! ```rust
//! use exact::{ExactDedupConfig, ExactDedupFilter};
//!
//! let mut filter = ExactDedupFilter::new(&ExactDedupConfig::default()).unwrap();
//! let (kept, report) = filter.filter(vec!["A", "B", "A"], |s| *s);
//! assert_eq!(kept, vec!["A", "B"]);
//! assert_eq!(report.dropped, 1);
//! ```

mod bloom;
mod config;
mod filter;

pub use crate::bloom::BloomFilter;
pub use crate::config::{DedupPosition, ExactDedupConfig, ExactError};
pub use crate::filter::{DedupReport, ExactDedupFilter};
