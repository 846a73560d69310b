//! Single-peak Gaussian estimation and refinement.

use serde::{Deserialize, Serialize};

use crate::data::model::{nearest_index, GaussianParams, SIGMA_FLOOR};

/// Sigma used when the half-maximum width collapses to zero.
const FALLBACK_SIGMA: f64 = 0.5;

// ---------------------------------------------------------------------------
// Half-maximum geometry
// ---------------------------------------------------------------------------

/// Walk out from `index` while the samples stay above `half`.
///
/// Returns the first index on each side at or below `half`, or the array
/// end when the signal never drops that far.
pub fn half_max_bounds(y: &[f64], index: usize, half: f64) -> (usize, usize) {
    if y.is_empty() {
        return (0, 0);
    }
    let index = index.min(y.len() - 1);
    let mut left = index;
    while left > 0 && y[left] > half {
        left -= 1;
    }
    let mut right = index;
    while right < y.len() - 1 && y[right] > half {
        right += 1;
    }
    (left, right)
}

/// Spacing between `index` and its right neighbour, or its left one at the
/// end of the array.
fn local_step(xs: &[f64], index: usize) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    if index + 1 < xs.len() {
        (xs[index + 1] - xs[index]).abs()
    } else {
        (xs[index] - xs[index - 1]).abs()
    }
}

// ---------------------------------------------------------------------------
// Closed-form estimate
// ---------------------------------------------------------------------------

/// Initial Gaussian guess for the peak at `peak_index`.
///
/// Amplitude and center come straight from the sample; sigma comes from the
/// half-maximum width. A zero width falls back to three local x steps, and
/// a zero sigma after that falls back to 0.5. An out-of-range index is
/// clamped to the last sample.
pub fn estimate(xs: &[f64], ys: &[f64], peak_index: usize) -> GaussianParams {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return GaussianParams {
            amplitude: 0.0,
            center: 0.0,
            sigma: FALLBACK_SIGMA,
        };
    }
    let index = peak_index.min(n - 1);
    let amplitude = ys[index];
    let center = xs[index];

    let (left, right) = half_max_bounds(&ys[..n], index, amplitude / 2.0);
    let mut fwhm = (xs[right] - xs[left]).abs();
    if fwhm == 0.0 {
        fwhm = 3.0 * local_step(&xs[..n], index);
    }
    let mut sigma = fwhm / GaussianParams::FWHM_PER_SIGMA;
    if sigma == 0.0 || !sigma.is_finite() {
        sigma = FALLBACK_SIGMA;
    }

    GaussianParams {
        amplitude,
        center,
        sigma,
    }
}

// ---------------------------------------------------------------------------
// Gradient-descent refinement
// ---------------------------------------------------------------------------

/// Fixed-budget gradient descent settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineOptions {
    pub iterations: usize,
    pub learning_rate: f64,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            iterations: 120,
            learning_rate: 0.03,
        }
    }
}

/// Refine a Gaussian against the samples around its center.
///
/// The fitting window holds `window_radius` samples on each side of the
/// sample nearest `initial.center`, clipped to the series. Fields of
/// `initial` that are zero or not finite are replaced by the window's
/// maximum, midpoint and span / 6. The parameters then take exactly
/// `options.iterations` synchronous steps down the gradient of the mean
/// squared error, with sigma clamped to [`SIGMA_FLOOR`] after each step.
///
/// The step size is fixed and applies to unscaled parameters. With the
/// default rate the descent only holds for small amplitudes (a few tens of
/// counts). Taller peaks overshoot: the center wanders off or sigma
/// collapses onto the floor. The result stays finite in those cases, but it
/// is no longer a fit. Lower `options.learning_rate` or rescale the
/// intensities before refining strong reflections.
pub fn refine(
    xs: &[f64],
    ys: &[f64],
    initial: GaussianParams,
    window_radius: usize,
    options: &RefineOptions,
) -> GaussianParams {
    let n = xs.len().min(ys.len());
    let Some(mid) = nearest_index(&xs[..n], initial.center) else {
        return initial;
    };
    let lo = mid.saturating_sub(window_radius);
    let hi = (mid + window_radius).min(n - 1);
    let wx = &xs[lo..=hi];
    let wy = &ys[lo..=hi];

    let (x_first, x_last) = (wx[0], wx[wx.len() - 1]);
    let mut amplitude = set_or(initial.amplitude, || {
        wy.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    });
    let mut center = set_or(initial.center, || (x_first + x_last) / 2.0);
    let mut sigma = set_or(initial.sigma, || (x_last - x_first).abs() / 6.0).max(SIGMA_FLOOR);

    let count = wx.len() as f64;
    let rate = options.learning_rate;
    for _ in 0..options.iterations {
        let (mut g_amp, mut g_center, mut g_sigma) = (0.0, 0.0, 0.0);
        let s2 = sigma * sigma;
        for (&x, &y) in wx.iter().zip(wy) {
            let d = x - center;
            let e = (-0.5 * d * d / s2).exp();
            let r = amplitude * e - y;
            g_amp += 2.0 * r * e;
            g_center += 2.0 * r * amplitude * e * d / s2;
            g_sigma += 2.0 * r * amplitude * e * d * d / (s2 * sigma);
        }
        amplitude -= rate * g_amp / count;
        center -= rate * g_center / count;
        sigma = (sigma - rate * g_sigma / count).max(SIGMA_FLOOR);
    }

    let refined = GaussianParams {
        amplitude,
        center,
        sigma,
    };
    log::debug!(
        "refined gaussian over {} samples in {} iterations: {refined}",
        wx.len(),
        options.iterations
    );
    refined
}

fn set_or(value: f64, fallback: impl FnOnce() -> f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        fallback()
    } else {
        value
    }
}
