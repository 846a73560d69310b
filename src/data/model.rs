use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Series – one diffraction scan
// ---------------------------------------------------------------------------

/// A scan as paired (2θ, intensity) samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    /// 2θ axis (x).
    pub x: Vec<f64>,
    /// Intensity axis (y) – same length as `x`.
    pub y: Vec<f64>,
}

impl Series {
    /// Pair up two arrays, rejecting mismatched lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, ParseError> {
        if x.len() != y.len() {
            return Err(ParseError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Series { x, y })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Reorder samples so that x is non-decreasing.
    ///
    /// The sort is stable, so samples sharing an x keep their file order.
    pub fn sorted_by_x(self) -> Self {
        let mut pairs: Vec<(f64, f64)> = self.x.into_iter().zip(self.y).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let (x, y) = pairs.into_iter().unzip();
        Series { x, y }
    }

    /// Index of the sample whose x lies closest to `target`.
    pub fn nearest_index(&self, target: f64) -> Option<usize> {
        nearest_index(&self.x, target)
    }

    /// Axis extents that frame the whole scan.
    ///
    /// Y gets 5% of its range as padding on both sides, and its lower bound
    /// never drops below zero.
    pub fn view_bounds(&self) -> Option<ViewBounds> {
        if self.is_empty() {
            return None;
        }
        let (x_min, x_max) = min_max(&self.x);
        let (y_min, y_max) = min_max(&self.y);
        let pad = (y_max - y_min) * 0.05;
        Some(ViewBounds {
            x_min,
            x_max,
            y_min: (y_min - pad).max(0.0),
            y_max: y_max + pad,
        })
    }
}

/// Linear nearest-neighbour search over an x axis.
pub fn nearest_index(xs: &[f64], target: f64) -> Option<usize> {
    xs.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - target)
                .abs()
                .partial_cmp(&(*b - target).abs())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Plot extents produced by [`Series::view_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

// ---------------------------------------------------------------------------
// Peak – a detected local maximum
// ---------------------------------------------------------------------------

/// A local maximum of the series it was detected on.
///
/// `index` is only meaningful against that exact series; any change to the
/// series invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub intensity: f64,
}

// ---------------------------------------------------------------------------
// GaussianParams – single-peak profile
// ---------------------------------------------------------------------------

/// Sigma never goes below this value.
pub const SIGMA_FLOOR: f64 = 1e-3;

/// `amplitude · exp(−½ ((x − center) / sigma)²)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub amplitude: f64,
    pub center: f64,
    pub sigma: f64,
}

impl GaussianParams {
    /// FWHM = 2·√(2·ln 2)·σ
    pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

    /// Evaluate the profile at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let z = (x - self.center) / self.sigma;
        self.amplitude * (-0.5 * z * z).exp()
    }

    /// Full width at half maximum of the profile.
    pub fn fwhm(&self) -> f64 {
        self.sigma * Self::FWHM_PER_SIGMA
    }

    /// Summed squared residual of the profile against the samples.
    pub fn sum_squared_error(&self, xs: &[f64], ys: &[f64]) -> f64 {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let r = self.eval(x) - y;
                r * r
            })
            .sum()
    }
}

impl fmt::Display for GaussianParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={:.3}  x0={:.4}  σ={:.4}",
            self.amplitude, self.center, self.sigma
        )
    }
}

// ---------------------------------------------------------------------------
// SelectedPeak – the one peak the user is working on
// ---------------------------------------------------------------------------

/// A peak picked for fitting, with its fit once one has been attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedPeak {
    pub peak: Peak,
    pub fit: Option<GaussianParams>,
}

impl SelectedPeak {
    pub fn new(peak: Peak) -> Self {
        SelectedPeak { peak, fit: None }
    }
}
