//! Band/row selection for a target Jaccard threshold.
//!
//! A pair with similarity `s` becomes a candidate with probability
//! `1 - (1 - s^r)^b`. The chosen `(b, r)` minimizes the weighted sum of the
//! false-positive area below the threshold and the false-negative area
//! above it, over every `b * r <= num_perm`.

const INTEGRATION_STEPS: usize = 1000;

/// Composite Simpson's rule over `[a, b]`.
fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    let h = (b - a) / INTEGRATION_STEPS as f64;
    let mut sum = f(a) + f(b);
    for i in 1..INTEGRATION_STEPS {
        let x = a + i as f64 * h;
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(x);
    }
    sum * h / 3.0
}

/// Probability that a pair with similarity `s` shares at least one band.
pub fn candidate_probability(s: f64, bands: usize, rows: usize) -> f64 {
    1.0 - (1.0 - s.powf(rows as f64)).powf(bands as f64)
}

/// Area of candidate probability over similarities below `threshold`.
pub fn false_positive_area(threshold: f64, bands: usize, rows: usize) -> f64 {
    integrate(|s| candidate_probability(s, bands, rows), 0.0, threshold)
}

/// Area of miss probability over similarities above `threshold`.
pub fn false_negative_area(threshold: f64, bands: usize, rows: usize) -> f64 {
    integrate(|s| 1.0 - candidate_probability(s, bands, rows), threshold, 1.0)
}

/// Pick `(bands, rows)` for `threshold` with a signature of `num_perm` slots.
///
/// `weights` is `(false_positive, false_negative)`. Ties keep the first
/// combination in `(bands, rows)` ascending order.
pub fn optimal_params(threshold: f64, num_perm: usize, weights: (f64, f64)) -> (usize, usize) {
    let (fp_weight, fn_weight) = weights;
    let mut best = (1, 1);
    let mut min_error = f64::INFINITY;
    for bands in 1..=num_perm {
        for rows in 1..=num_perm / bands {
            let error = fp_weight * false_positive_area(threshold, bands, rows)
                + fn_weight * false_negative_area(threshold, bands, rows);
            if error < min_error {
                min_error = error;
                best = (bands, rows);
            }
        }
    }
    best
}
