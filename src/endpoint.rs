//! Remote refine endpoint.
//!
//! A serverless-style handler: the caller hands over the HTTP method and raw
//! body, and gets back a status code and a JSON body. Transport is left to
//! whatever hosts it (see the `refine` binary for a stdin/stdout host).

use serde::{Deserialize, Serialize};

use crate::data::loader::parse_scan_min;
use crate::error::EndpointError;
use crate::pipeline::{gaussian, metrics, peaks, smooth};

/// Scans with fewer valid points are rejected.
pub const MIN_POINTS: usize = 5;
/// Moving-average window applied before peak picking.
pub const SMOOTHING_WINDOW: usize = 5;
/// Fraction of `max − median` added to the median to form the threshold.
pub const THRESHOLD_FRACTION: f64 = 0.12;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Incoming invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Request body: the raw scan text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub content: String,
}

/// One peak as reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakReport {
    pub index: usize,
    pub two_theta: f64,
    /// Unsmoothed intensity at `index`.
    pub intensity: f64,
    pub fwhm: f64,
    /// Trapezoidal area of the unsmoothed scan between the half-maximum bounds.
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineResponse {
    pub peaks: Vec<PeakReport>,
}

/// Outgoing reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Handle one invocation, never failing: errors become status codes.
pub fn handle(event: &RefineEvent) -> EndpointResponse {
    let result = if event.http_method == "POST" {
        let body = event.body.as_deref().filter(|b| !b.is_empty());
        analyze_body(body.unwrap_or("{}"))
    } else {
        Err(EndpointError::MethodNotAllowed)
    };

    match result {
        Ok(response) => reply(200, &response),
        Err(err) => {
            log::warn!("refine request rejected: {err}");
            reply(
                err.status_code(),
                &ErrorBody {
                    error: err.to_string(),
                },
            )
        }
    }
}

fn reply<T: Serialize>(status_code: u16, payload: &T) -> EndpointResponse {
    let body = serde_json::to_string(payload)
        .unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#));
    EndpointResponse { status_code, body }
}

/// Decode a JSON body and analyse its scan.
pub fn analyze_body(body: &str) -> Result<RefineResponse, EndpointError> {
    let request: RefineRequest = serde_json::from_str(body)?;
    analyze(&request.content)
}

/// Smooth, threshold and measure the peaks of a scan.
///
/// The scan is sorted by 2θ first. Peaks are strict local maxima of the
/// window-5 moving average lying above `median + 0.12·(max − median)`.
/// Width and area are measured between the first samples on either side
/// at or below half the smoothed peak height; the area integrates the
/// unsmoothed intensities.
pub fn analyze(content: &str) -> Result<RefineResponse, EndpointError> {
    let series = parse_scan_min(content, MIN_POINTS)?.sorted_by_x();
    let (xs, ys) = (&series.x, &series.y);

    let smoothed = smooth(ys, SMOOTHING_WINDOW);
    let threshold = metrics::adaptive_threshold(&smoothed, THRESHOLD_FRACTION)
        .unwrap_or(f64::INFINITY);

    let reports: Vec<PeakReport> = peaks::detect_above(&smoothed, threshold, 0)
        .into_iter()
        .map(|peak| {
            let (left, right) =
                gaussian::half_max_bounds(&smoothed, peak.index, peak.intensity / 2.0);
            PeakReport {
                index: peak.index,
                two_theta: xs[peak.index],
                intensity: ys[peak.index],
                fwhm: (xs[right] - xs[left]).abs(),
                area: metrics::trapezoid_area(xs, ys, left, right),
            }
        })
        .collect();

    log::debug!(
        "refine endpoint: {} points, threshold {threshold:.3}, {} peaks",
        series.len(),
        reports.len()
    );
    Ok(RefineResponse { peaks: reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scan_text() -> String {
        (0..=400)
            .map(|i| {
                let x = 20.0 + i as f64 * 0.05;
                let y = 10.0 + 200.0 * (-0.5 * ((x - 30.0) / 0.3f64).powi(2)).exp();
                format!("{x:.2} {y:.4}\n")
            })
            .collect()
    }

    fn post(body: &str) -> EndpointResponse {
        handle(&RefineEvent {
            http_method: "POST".into(),
            body: Some(body.into()),
        })
    }

    #[test]
    fn finds_the_single_peak_with_width_and_area() {
        let resp = analyze(&scan_text()).unwrap();
        assert_eq!(resp.peaks.len(), 1);
        let p = &resp.peaks[0];
        assert_eq!(p.index, 200);
        assert_relative_eq!(p.two_theta, 30.0, epsilon = 1e-9);
        assert_relative_eq!(p.intensity, 210.0, epsilon = 1e-3);
        assert!(p.fwhm > 0.5 && p.fwhm < 1.5, "fwhm {}", p.fwhm);
        assert!(p.area > 0.0);
    }

    #[test]
    fn non_post_is_rejected() {
        let resp = handle(&RefineEvent {
            http_method: "GET".into(),
            body: None,
        });
        assert_eq!(resp.status_code, 405);
        assert!(resp.body.contains("Use POST"));
    }

    #[test]
    fn method_must_match_exactly() {
        let resp = handle(&RefineEvent {
            http_method: "post".into(),
            body: Some(serde_json::json!({ "content": scan_text() }).to_string()),
        });
        assert_eq!(resp.status_code, 405);
    }

    #[test]
    fn empty_body_is_treated_as_missing() {
        let resp = post("");
        assert_eq!(resp.status_code, 400);
        let missing = handle(&RefineEvent {
            http_method: "POST".into(),
            body: None,
        });
        assert_eq!(missing, resp);
    }

    #[test]
    fn area_integrates_the_unsmoothed_scan() {
        let xs: Vec<f64> = (0..=10).map(f64::from).collect();
        let ys = [0.0, 0.0, 0.0, 1.0, 4.0, 10.0, 4.0, 1.0, 0.0, 0.0, 0.0];
        let content: String = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| format!("{x} {y}\n"))
            .collect();

        let resp = analyze(&content).unwrap();
        assert_eq!(resp.peaks.len(), 1);
        let p = &resp.peaks[0];
        assert_eq!(p.index, 5);
        assert_eq!(p.intensity, 10.0);

        // smoothed peak height 4.0, half-max bounds at indices 2 and 8
        let smoothed = smooth(&ys, SMOOTHING_WINDOW);
        assert_eq!(gaussian::half_max_bounds(&smoothed, 5, 2.0), (2, 8));
        assert_relative_eq!(p.fwhm, 6.0);
        assert_eq!(p.area, metrics::trapezoid_area(&xs, &ys, 2, 8));
        assert_relative_eq!(p.area, 20.0, epsilon = 1e-12);
        let smoothed_area = metrics::trapezoid_area(&xs, &smoothed, 2, 8);
        assert!((p.area - smoothed_area).abs() > 1.0);
    }

    #[test]
    fn shuffled_lines_give_the_same_peaks() {
        let text = scan_text();
        let lines: Vec<&str> = text.lines().collect();
        // 401 lines; stepping by 7 visits every line once, out of order
        let shuffled: String = (0..lines.len())
            .map(|k| format!("{}\n", lines[k * 7 % lines.len()]))
            .collect();
        assert_ne!(shuffled, text);

        let sorted = analyze(&text).unwrap();
        let resp = analyze(&shuffled).unwrap();
        assert_eq!(resp.peaks.len(), 1);
        assert_eq!(resp.peaks[0].index, 200);
        assert_relative_eq!(resp.peaks[0].two_theta, 30.0, epsilon = 1e-9);
        assert_eq!(resp, sorted);
    }

    #[test]
    fn too_few_points_is_a_client_error() {
        let body = serde_json::json!({ "content": "1 1\n2 2\n3 3\n4 4" }).to_string();
        let resp = post(&body);
        assert_eq!(resp.status_code, 400);
        assert!(resp.body.contains("error"));
    }

    #[test]
    fn missing_content_is_a_client_error() {
        assert_eq!(post("{}").status_code, 400);
    }

    #[test]
    fn malformed_json_is_a_server_error() {
        assert_eq!(post("{not json").status_code, 500);
    }

    #[test]
    fn successful_reply_uses_camel_case() {
        let body = serde_json::json!({ "content": scan_text() }).to_string();
        let resp = post(&body);
        assert_eq!(resp.status_code, 200);
        let value: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        let peak = &value["peaks"][0];
        assert!(peak["twoTheta"].is_number());
        assert!(peak["fwhm"].is_number());
        assert!(peak["area"].is_number());
    }
}
