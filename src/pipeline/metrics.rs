//! Scalar summaries used by the remote refine endpoint.

use std::cmp::Ordering;

/// Upper median: the element at `len / 2` of the sorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(sorted[sorted.len() / 2])
}

/// `median + fraction · (max − median)`
pub fn adaptive_threshold(values: &[f64], fraction: f64) -> Option<f64> {
    let med = median(values)?;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(med + (max - med) * fraction)
}

/// Trapezoidal area under the samples between indices `left` and `right`.
///
/// The result is always non-negative.
pub fn trapezoid_area(xs: &[f64], ys: &[f64], left: usize, right: usize) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let end = right.min(n - 1);
    let area: f64 = (left..end)
        .map(|k| 0.5 * (ys[k] + ys[k + 1]) * (xs[k + 1] - xs[k]))
        .sum();
    area.abs()
}
