/// Centered moving average.
///
/// Each output sample is the mean of the inputs in `[i - w/2, i + w/2]`,
/// clipped to the array. Edge windows shrink instead of zero-padding, so
/// the ends carry a small bias. A window of 0 or 1 returns a plain copy.
pub fn smooth(y: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return y.to_vec();
    }

    let half = window / 2;
    let n = y.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let slice = &y[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
