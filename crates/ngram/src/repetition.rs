//! Character-weighted n-gram repetition ratios.

use std::collections::BTreeMap;
use std::hash::Hash;

use crate::table::NgramTable;
use crate::{round4, NgramConfig};

/// Count the n-grams of `tokens` for one `n`.
pub fn ngram_counts<S: Hash + Eq>(tokens: &[S], n: usize) -> NgramTable<'_, S> {
    NgramTable::build(tokens, n)
}

fn char_lengths<S: AsRef<str>>(tokens: &[S]) -> Vec<usize> {
    tokens.iter().map(|t| t.as_ref().chars().count()).collect()
}

/// Share of characters covered by n-grams that occur more than once.
///
/// A token counts once even when several repeated n-grams overlap it.
/// Returns exactly `0.0` when no n-gram repeats. Rounded to 4 decimals.
pub fn chars_dupe_ngrams<S: AsRef<str> + Hash + Eq>(tokens: &[S], n: usize) -> f64 {
    let table = ngram_counts(tokens, n);
    if table.is_empty() {
        return 0.0;
    }
    let lengths = char_lengths(tokens);
    let total: usize = lengths.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let mut covered = vec![false; tokens.len()];
    for (start, window) in tokens.windows(n).enumerate() {
        if table.count(window) > 1 {
            covered[start..start + n].fill(true);
        }
    }
    let repeated: usize = lengths
        .iter()
        .zip(&covered)
        .filter(|(_, hit)| **hit)
        .map(|(len, _)| len)
        .sum();
    round4(repeated as f64 / total as f64)
}

/// Characters of the most frequent n-gram times its frequency, over all
/// characters.
///
/// Zero when the most frequent n-gram occurs once. Overlapping occurrences
/// are counted in full, so the ratio can exceed 1.0 on degenerate input.
pub fn chars_top_ngrams<S: AsRef<str> + Hash + Eq>(tokens: &[S], n: usize) -> f64 {
    let table = ngram_counts(tokens, n);
    let Some((top, frequency)) = table.most_frequent() else {
        return 0.0;
    };
    if frequency <= 1 {
        return 0.0;
    }
    let total: usize = char_lengths(tokens).iter().sum();
    if total == 0 {
        return 0.0;
    }
    let top_chars: usize = char_lengths(top).iter().sum();
    (top_chars * frequency) as f64 / total as f64
}

/// Repetition features keyed `chars_dupe_{n}grams` and `chars_top_{n}grams`.
///
/// Duplicate ratios cover n in `2..=min(max_dupe_n, len)`, top ratios
/// n in `2..=min(max_top_n, len)`. Fewer than two tokens yields no keys.
pub fn key_ngrams<S: AsRef<str> + Hash + Eq>(
    tokens: &[S],
    cfg: &NgramConfig,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    let max_n = tokens.len().min(cfg.max_dupe_n);
    for n in 2..=max_n {
        if n <= cfg.max_top_n {
            out.insert(format!("chars_top_{n}grams"), chars_top_ngrams(tokens, n));
        }
        out.insert(format!("chars_dupe_{n}grams"), chars_dupe_ngrams(tokens, n));
    }
    out
}
