use crate::config::ProcessingSettings;
use crate::data::model::{GaussianParams, Peak, SelectedPeak, Series};
use crate::pipeline::{baseline, gaussian, peaks, smooth, PolynomialBaseline};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One-shot plot commands, consumed by the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRequest {
    FitToData,
    ResetZoom,
}

/// The full session state, independent of rendering.
///
/// The pipeline functions never hold on to any of this; every processing
/// step reads from here and writes its result back.
pub struct AppState {
    /// Display name of the loaded scan.
    pub source_name: Option<String>,

    /// Loaded scan, sorted by 2θ (None until user loads a file).
    pub series: Option<Series>,

    /// Current processed intensities, same length as `series`.
    pub processed: Vec<f64>,

    /// Most recent background fit.
    pub baseline: Option<PolynomialBaseline>,

    /// Peaks detected on the current `processed` values.
    pub peaks: Vec<Peak>,

    /// Peak chosen for fitting.
    pub selected: Option<SelectedPeak>,

    /// Live processing settings.
    pub settings: ProcessingSettings,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Activity log shown under the plot.
    pub activity: Vec<String>,

    /// Whether the plot draws its grid.
    pub show_grid: bool,

    /// Pending plot command.
    pub view_request: Option<ViewRequest>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(ProcessingSettings::default())
    }
}

impl AppState {
    pub fn with_settings(settings: ProcessingSettings) -> Self {
        Self {
            source_name: None,
            series: None,
            processed: Vec::new(),
            baseline: None,
            peaks: Vec::new(),
            selected: None,
            settings,
            status_message: None,
            activity: Vec::new(),
            show_grid: true,
            view_request: None,
        }
    }

    /// Append a line to the activity log.
    pub fn log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{msg}");
        self.activity.push(msg);
    }

    /// Replace the session with a newly loaded scan.
    pub fn set_series(&mut self, name: impl Into<String>, series: Series) {
        let name = name.into();
        self.processed = series.y.clone();
        self.baseline = None;
        self.invalidate_peaks();
        self.status_message = None;
        self.view_request = Some(ViewRequest::FitToData);
        self.log(format!("Loaded {name} ({} points)", series.len()));
        self.series = Some(series);
        self.source_name = Some(name);
    }

    /// Drop peaks and selection; they refer to indices of the old values.
    fn invalidate_peaks(&mut self) {
        self.peaks.clear();
        self.selected = None;
    }

    /// Moving-average the processed intensities.
    pub fn apply_smoothing(&mut self) {
        if self.series.is_none() {
            return;
        }
        let window = self.settings.smoothing_window;
        self.processed = smooth(&self.processed, window);
        self.invalidate_peaks();
        self.log(format!("Smoothed with window {window}"));
    }

    /// Fit a polynomial background to the processed values and remove it.
    pub fn subtract_baseline(&mut self) {
        let Some(series) = &self.series else {
            return;
        };
        let degree = self.settings.baseline_degree;
        let fit = baseline::fit(&series.x, &self.processed, degree);
        self.processed = baseline::subtract(&series.x, &self.processed, &fit);
        self.baseline = Some(fit);
        self.invalidate_peaks();
        self.log(format!("Subtracted degree-{degree} baseline"));
    }

    /// Restore the raw intensities and clear every derived result.
    pub fn reset_processing(&mut self) {
        let Some(series) = &self.series else {
            return;
        };
        self.processed = series.y.clone();
        self.baseline = None;
        self.invalidate_peaks();
        self.log("Processing reset");
    }

    /// Run peak detection on the processed values.
    pub fn detect_peaks(&mut self) -> usize {
        if self.series.is_none() {
            return 0;
        }
        self.peaks = peaks::detect(
            &self.processed,
            self.settings.threshold_factor,
            self.settings.min_distance,
        );
        self.selected = None;
        let count = self.peaks.len();
        self.log(format!("Detected {count} peaks"));
        count
    }

    /// Select the `n`-th detected peak.
    pub fn select_peak(&mut self, n: usize) -> bool {
        match self.peaks.get(n) {
            Some(&peak) => {
                self.selected = Some(SelectedPeak::new(peak));
                true
            }
            None => false,
        }
    }

    /// Select the detected peak closest to `x`, returning its list position.
    pub fn select_nearest(&mut self, x: f64) -> Option<usize> {
        let series = self.series.as_ref()?;
        let n = self
            .peaks
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (series.x[a.index] - x).abs();
                let db = (series.x[b.index] - x).abs();
                da.total_cmp(&db)
            })
            .map(|(n, _)| n)?;
        self.select_peak(n);
        Some(n)
    }

    /// Estimate and refine a Gaussian for the selected peak.
    pub fn fit_selected(&mut self) -> Option<GaussianParams> {
        let series = self.series.as_ref()?;
        let selected = self.selected.as_mut()?;
        let initial = gaussian::estimate(&series.x, &self.processed, selected.peak.index);
        let fit = gaussian::refine(
            &series.x,
            &self.processed,
            initial,
            self.settings.fit_window_radius,
            &self.settings.refine,
        );
        selected.fit = Some(fit);
        self.log(format!("Fitted peak at 2θ={:.3}: {fit}", fit.center));
        Some(fit)
    }

    /// 2θ of a detected peak.
    pub fn peak_x(&self, peak: &Peak) -> Option<f64> {
        self.series.as_ref()?.x.get(peak.index).copied()
    }
}
