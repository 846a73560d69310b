//! Local-maximum peak picking.

use crate::data::model::Peak;

/// Detect peaks against a threshold relative to the mean intensity.
///
/// The threshold is `max(0, mean(y) · threshold_factor)`; a strict interior
/// local maximum at or above it is a candidate. Candidates closer than
/// `min_distance` samples to the last accepted peak compete with it: the
/// higher one wins, and on equal height the earlier one stays. Peaks come
/// back in ascending index order.
pub fn detect(y: &[f64], threshold_factor: f64, min_distance: usize) -> Vec<Peak> {
    if y.is_empty() {
        return Vec::new();
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let threshold = (mean * threshold_factor).max(0.0);
    let peaks = scan_maxima(y, |v| v >= threshold, min_distance);
    log::debug!(
        "detected {} peaks (threshold {threshold:.3}, min distance {min_distance})",
        peaks.len()
    );
    peaks
}

/// Detect peaks strictly above an absolute threshold.
pub fn detect_above(y: &[f64], threshold: f64, min_distance: usize) -> Vec<Peak> {
    scan_maxima(y, |v| v > threshold, min_distance)
}

fn scan_maxima(y: &[f64], passes: impl Fn(f64) -> bool, min_distance: usize) -> Vec<Peak> {
    let mut peaks: Vec<Peak> = Vec::new();
    if y.len() < 3 {
        return peaks;
    }

    for i in 1..y.len() - 1 {
        let v = y[i];
        if !(v > y[i - 1] && v > y[i + 1] && passes(v)) {
            continue;
        }
        let candidate = Peak {
            index: i,
            intensity: v,
        };
        match peaks.last_mut() {
            Some(last) if i - last.index < min_distance => {
                if v > last.intensity {
                    *last = candidate;
                }
            }
            _ => peaks.push(candidate),
        }
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(peaks: &[Peak]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }

    #[test]
    fn close_peaks_keep_the_higher_one() {
        let peaks = detect(&[0.0, 5.0, 1.0, 6.0, 0.0], 1.0, 3);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 3);
        assert_eq!(peaks[0].intensity, 6.0);
    }

    #[test]
    fn equal_heights_keep_the_earlier_peak() {
        let peaks = detect(&[0.0, 5.0, 1.0, 5.0, 0.0], 0.0, 3);
        assert_eq!(indices(&peaks), vec![1]);
    }

    #[test]
    fn distant_peaks_are_all_kept() {
        let y = [0.0, 5.0, 1.0, 0.0, 0.0, 6.0, 0.0];
        assert_eq!(indices(&detect(&y, 0.0, 3)), vec![1, 5]);
    }

    #[test]
    fn endpoints_are_never_peaks() {
        let y = [9.0, 1.0, 2.0, 1.0, 9.0];
        assert_eq!(indices(&detect(&y, 0.0, 1)), vec![2]);
    }

    #[test]
    fn threshold_filters_small_maxima() {
        // mean = 2.0, threshold 1.5 × 2.0 = 3.0
        let y = [0.0, 2.0, 0.0, 8.0, 0.0];
        assert_eq!(indices(&detect(&y, 1.5, 1)), vec![3]);
    }

    #[test]
    fn negative_mean_clamps_threshold_to_zero() {
        let y = [-5.0, -1.0, -5.0, 2.0, -5.0];
        assert_eq!(indices(&detect(&y, 1.0, 1)), vec![3]);
    }

    #[test]
    fn plateaus_are_not_strict_maxima() {
        let y = [0.0, 3.0, 3.0, 0.0];
        assert!(detect(&y, 0.0, 1).is_empty());
    }

    #[test]
    fn short_or_empty_input_gives_no_peaks() {
        assert!(detect(&[], 1.0, 3).is_empty());
        assert!(detect(&[1.0, 2.0], 1.0, 3).is_empty());
    }

    #[test]
    fn detect_above_is_strict() {
        let y = [0.0, 4.0, 0.0, 5.0, 0.0];
        assert_eq!(indices(&detect_above(&y, 4.0, 0)), vec![3]);
    }
}
