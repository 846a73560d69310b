use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::GaussianParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JSON artifact – everything needed to reproduce what the user saw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPeak {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSelection {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub fit: Option<GaussianParams>,
}

/// Snapshot of a processing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub source: Option<String>,
    pub x: Vec<f64>,
    pub raw_y: Vec<f64>,
    pub processed_y: Vec<f64>,
    /// Background coefficients, low to high degree.
    pub baseline: Option<Vec<f64>>,
    pub peaks: Vec<ExportedPeak>,
    pub selected: Option<ExportedSelection>,
}

impl ExportArtifact {
    /// Snapshot the session; `None` when no scan is loaded.
    pub fn from_state(state: &AppState) -> Option<Self> {
        let series = state.series.as_ref()?;
        let peaks = state
            .peaks
            .iter()
            .map(|p| ExportedPeak {
                index: p.index,
                x: series.x[p.index],
                y: p.intensity,
            })
            .collect();
        let selected = state.selected.map(|s| ExportedSelection {
            index: s.peak.index,
            x: series.x[s.peak.index],
            y: s.peak.intensity,
            fit: s.fit,
        });

        Some(ExportArtifact {
            source: state.source_name.clone(),
            x: series.x.clone(),
            raw_y: series.y.clone(),
            processed_y: state.processed.clone(),
            baseline: state.baseline.as_ref().map(|b| b.coefficients.clone()),
            peaks,
            selected,
        })
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("serialising export")
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        self.write_json(std::io::BufWriter::new(file))
    }
}

// ---------------------------------------------------------------------------
// CSV peak table
// ---------------------------------------------------------------------------

/// One row of the peak table. Fit columns are filled for the selected peak
/// only, and only once it has been fitted.
#[derive(Debug, Serialize)]
struct PeakRow {
    index: usize,
    two_theta: f64,
    intensity: f64,
    fit_amplitude: Option<f64>,
    fit_center: Option<f64>,
    fit_sigma: Option<f64>,
    fit_fwhm: Option<f64>,
}

/// Write the detected peaks as CSV.
pub fn write_peak_table<W: Write>(state: &AppState, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if let Some(series) = &state.series {
        for peak in &state.peaks {
            let fit = state
                .selected
                .filter(|s| s.peak.index == peak.index)
                .and_then(|s| s.fit);
            wtr.serialize(PeakRow {
                index: peak.index,
                two_theta: series.x[peak.index],
                intensity: peak.intensity,
                fit_amplitude: fit.map(|f| f.amplitude),
                fit_center: fit.map(|f| f.center),
                fit_sigma: fit.map(|f| f.sigma),
                fit_fwhm: fit.map(|f| f.fwhm()),
            })
            .context("writing peak row")?;
        }
    }
    wtr.flush().context("flushing peak table")?;
    Ok(())
}

pub fn save_peak_table(state: &AppState, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_peak_table(state, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;

    fn state_with_peaks() -> AppState {
        let x: Vec<f64> = (0..9).map(|i| 10.0 + i as f64).collect();
        let y = vec![0.0, 1.0, 4.0, 1.0, 0.0, 2.0, 6.0, 2.0, 0.0];
        let mut state = AppState::default();
        state.settings.threshold_factor = 0.0;
        state.settings.min_distance = 2;
        state.set_series("scan.asr", Series::new(x, y).unwrap());
        state.detect_peaks();
        state
    }

    #[test]
    fn artifact_bundles_series_peaks_and_selection() {
        let mut state = state_with_peaks();
        state.select_peak(1);
        let art = ExportArtifact::from_state(&state).unwrap();
        assert_eq!(art.source.as_deref(), Some("scan.asr"));
        assert_eq!(art.x.len(), 9);
        assert_eq!(art.raw_y, art.processed_y);
        assert!(art.baseline.is_none());
        assert_eq!(
            art.peaks,
            vec![
                ExportedPeak { index: 2, x: 12.0, y: 4.0 },
                ExportedPeak { index: 6, x: 16.0, y: 6.0 },
            ]
        );
        let sel = art.selected.unwrap();
        assert_eq!(sel.index, 6);
        assert!(sel.fit.is_none());
    }

    #[test]
    fn artifact_json_round_trips_through_a_file() {
        let mut state = state_with_peaks();
        state.select_peak(0);
        state.fit_selected();
        let art = ExportArtifact::from_state(&state).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        art.save_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: ExportArtifact = serde_json::from_str(&text).unwrap();
        assert_eq!(back.x, art.x);
        assert_eq!(back.raw_y, art.raw_y);
        assert_eq!(back.peaks, art.peaks);
        assert!(back.selected.unwrap().fit.is_some());
    }

    #[test]
    fn no_scan_means_no_artifact() {
        assert!(ExportArtifact::from_state(&AppState::default()).is_none());
    }

    #[test]
    fn peak_table_fills_fit_columns_for_selection_only() {
        let mut state = state_with_peaks();
        state.select_peak(1);
        state.fit_selected();

        let mut buf = Vec::new();
        write_peak_table(&state, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "index,two_theta,intensity,fit_amplitude,fit_center,fit_sigma,fit_fwhm"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2,12.0,4.0,,,,"));
        assert!(lines[2].starts_with("6,16.0,6.0,"));
        assert!(!lines[2].ends_with(",,,,"));
    }
}
