//! Numeric helpers shared by the scoring rules
//!
//! All helpers are total: empty inputs produce 0 instead of NaN so rules can
//! feed their results straight into a score.

use std::collections::HashMap;
use std::hash::Hash;

/// Rooms at which the complexity factor saturates
const COMPLEXITY_SATURATION_ROOMS: f64 = 10.0;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Coefficient of variation (std / mean); 0 when the mean is not positive
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m <= 0.0 {
        return 0.0;
    }
    std_dev(values) / m
}

/// Shannon entropy of a frequency table, normalized by `ln(categories)`.
///
/// `categories` is the number of outcomes the distribution could spread over;
/// with fewer than two the entropy is defined as 0.
pub fn normalized_entropy<K: Eq + Hash>(
    items: impl IntoIterator<Item = K>,
    categories: usize,
) -> f64 {
    let mut counts: HashMap<K, usize> = HashMap::new();
    let mut total = 0usize;
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 || categories < 2 {
        return 0.0;
    }
    // Sorted so the float sum does not depend on hash order
    let mut freqs: Vec<usize> = counts.into_values().collect();
    freqs.sort_unstable();
    let entropy: f64 = freqs
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.ln()
        })
        .sum();
    clamp01(entropy / (categories as f64).ln())
}

/// Geometric mean over the strictly positive factors only.
///
/// A zero factor is dropped rather than collapsing the product; if no factor
/// is positive the result is 0.
pub fn geometric_mean_nonzero(factors: &[f64]) -> f64 {
    let positive: Vec<f64> = factors
        .iter()
        .copied()
        .filter(|f| f.is_finite() && *f > 0.0)
        .collect();
    if positive.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = positive.iter().map(|f| f.ln()).sum();
    (log_sum / positive.len() as f64).exp()
}

/// Unnormalized Gaussian bump: 1 at `center`, decaying with `sigma`
pub fn gaussian(value: f64, center: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if value == center { 1.0 } else { 0.0 };
    }
    (-(value - center).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// Scales scores of tiny layouts down: 0.5 for an empty level, 1.0 from ten rooms up
pub fn complexity_factor(room_count: usize) -> f64 {
    0.5 + 0.5 * (room_count as f64 / COMPLEXITY_SATURATION_ROOMS).min(1.0)
}

/// Clamp to [0, 1], mapping NaN to 0
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
