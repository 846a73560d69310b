//! Least-squares polynomial background.
//!
//! The fit solves the normal equations directly, which is only well
//! conditioned for low degrees (0–3). Higher degrees on wide 2θ ranges
//! lose precision quickly; that is a known limitation of this method.

use serde::{Deserialize, Serialize};

/// Pivots smaller than this are treated as singular.
const PIVOT_EPS: f64 = 1e-12;

/// Polynomial `c0 + c1·x + … + cd·x^d`, coefficients low to high degree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolynomialBaseline {
    pub coefficients: Vec<f64>,
}

impl PolynomialBaseline {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate at `x` (Horner).
    pub fn evaluate(&self, x: f64) -> f64 {
        evaluate(&self.coefficients, x)
    }

    /// Evaluate at every x.
    pub fn evaluate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Evaluate a coefficient vector (low to high degree) at `x`.
pub fn evaluate(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Fit a polynomial of the given degree to the samples.
///
/// Builds the `(d+1)×(d+1)` moment matrix of power sums `Σx^(r+c)` and the
/// right-hand side `Σy·x^r`, then solves by Gaussian elimination with
/// partial pivoting. A row whose pivot falls below `1e-12` is left
/// unresolved and its coefficient stays 0.
pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> PolynomialBaseline {
    let m = degree + 1;

    // Power sums Σx^k for k = 0..=2d
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; m];
    for (&x, &y) in xs.iter().zip(ys) {
        let mut xp = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            if k < m {
                rhs[k] += y * xp;
            }
            *sum += xp;
            xp *= x;
        }
    }

    // Augmented matrix [A | b]
    let mut a: Vec<Vec<f64>> = (0..m)
        .map(|row| {
            let mut r: Vec<f64> = (0..m).map(|col| power_sums[row + col]).collect();
            r.push(rhs[row]);
            r
        })
        .collect();

    let mut degenerate = false;
    for col in 0..m {
        let pivot_row = (col..m)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot_row);

        let pivot = a[col][col];
        if pivot.abs() < PIVOT_EPS {
            degenerate = true;
            continue;
        }
        for row in (col + 1)..m {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..=m {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut coefficients = vec![0.0; m];
    for row in (0..m).rev() {
        let pivot = a[row][row];
        if pivot.abs() < PIVOT_EPS {
            continue;
        }
        let tail: f64 = ((row + 1)..m).map(|k| a[row][k] * coefficients[k]).sum();
        coefficients[row] = (a[row][m] - tail) / pivot;
    }

    if degenerate {
        log::warn!(
            "baseline fit of degree {degree} on {} points hit a near-singular pivot; \
             some coefficients left at 0",
            xs.len()
        );
    }
    log::debug!("baseline coefficients: {coefficients:?}");
    PolynomialBaseline { coefficients }
}

/// `y − baseline(x)` for every sample.
pub fn subtract(xs: &[f64], ys: &[f64], baseline: &PolynomialBaseline) -> Vec<f64> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| y - baseline.evaluate(x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_a_line() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 3.0).collect();
        let b = fit(&xs, &ys, 1);
        assert_eq!(b.degree(), 1);
        assert_abs_diff_eq!(b.coefficients[0], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.coefficients[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn recovers_a_quadratic() {
        let xs: Vec<f64> = (0..=40).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 1.0 - 0.5 * x + 0.25 * x * x).collect();
        let b = fit(&xs, &ys, 2);
        assert_abs_diff_eq!(b.coefficients[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.coefficients[1], -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(b.coefficients[2], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn degree_zero_is_the_mean() {
        let b = fit(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0], 0);
        assert_abs_diff_eq!(b.coefficients[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_input_leaves_zero_coefficients() {
        let b = fit(&[], &[], 2);
        assert_eq!(b.coefficients, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn too_few_points_do_not_panic() {
        // Two identical x values cannot pin down a line.
        let b = fit(&[1.0, 1.0], &[3.0, 3.0], 1);
        assert_eq!(b.coefficients.len(), 2);
        assert!(b.coefficients.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn evaluate_uses_low_to_high_order() {
        assert_abs_diff_eq!(evaluate(&[3.0, 2.0, 1.0], 2.0), 11.0);
        assert_abs_diff_eq!(evaluate(&[], 2.0), 0.0);
    }

    #[test]
    fn subtract_removes_the_fitted_background() {
        let xs = [0.0, 1.0, 2.0];
        let base = PolynomialBaseline {
            coefficients: vec![1.0, 1.0],
        };
        assert_eq!(subtract(&xs, &[1.0, 3.0, 5.0], &base), vec![0.0, 1.0, 2.0]);
        assert_eq!(base.evaluate_all(&xs), vec![1.0, 2.0, 3.0]);
    }
}
