use eframe::egui::{Ui, Vec2b};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::color;
use rusty_xrd::state::{AppState, ViewRequest};

/// Samples drawn across ±4σ of a fitted profile.
const FIT_SAMPLES: usize = 200;

// ---------------------------------------------------------------------------
// Scan plot (central panel)
// ---------------------------------------------------------------------------

/// Render the scan with its processing layers. Clicking selects the nearest
/// detected peak.
pub fn scan_plot(ui: &mut Ui, state: &mut AppState) {
    let Some(series) = &state.series else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a scan to begin  (File → Open…)");
        });
        return;
    };

    let request = state.view_request.take();
    let bounds = series.view_bounds();
    let palette = color::peak_palette(state.peaks.len());

    let clicked_x = Plot::new("scan_plot")
        .legend(Legend::default())
        .x_axis_label("2θ")
        .y_axis_label("Intensity")
        .show_grid(state.show_grid)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .allow_double_click_reset(true)
        .show(ui, |plot_ui| {
            match (request, bounds) {
                (Some(ViewRequest::FitToData), Some(b)) => {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                        [b.x_min, b.y_min],
                        [b.x_max, b.y_max],
                    ));
                }
                (Some(ViewRequest::ResetZoom), _) => plot_ui.set_auto_bounds(Vec2b::TRUE),
                _ => {}
            }

            let raw: PlotPoints = series
                .x
                .iter()
                .zip(&series.y)
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.line(Line::new(raw).name("Raw").color(color::RAW).width(1.0));

            if state.processed != series.y {
                let processed: PlotPoints = series
                    .x
                    .iter()
                    .zip(&state.processed)
                    .map(|(&x, &y)| [x, y])
                    .collect();
                plot_ui.line(
                    Line::new(processed)
                        .name("Processed")
                        .color(color::PROCESSED)
                        .width(1.8),
                );
            }

            if let Some(baseline) = &state.baseline {
                let curve: PlotPoints = series
                    .x
                    .iter()
                    .map(|&x| [x, baseline.evaluate(x)])
                    .collect();
                plot_ui.line(
                    Line::new(curve)
                        .name("Baseline")
                        .color(color::BASELINE)
                        .width(1.2),
                );
            }

            for (n, peak) in state.peaks.iter().enumerate() {
                let x = series.x[peak.index];
                let is_selected = state
                    .selected
                    .is_some_and(|s| s.peak.index == peak.index);
                plot_ui.points(
                    Points::new(vec![[x, peak.intensity]])
                        .name(format!("Peak {}", n + 1))
                        .shape(MarkerShape::Diamond)
                        .radius(if is_selected { 7.0 } else { 4.5 })
                        .color(palette[n]),
                );
            }

            if let Some(fit) = state.selected.and_then(|s| s.fit) {
                let lo = fit.center - 4.0 * fit.sigma;
                let step = 8.0 * fit.sigma / FIT_SAMPLES as f64;
                let curve: PlotPoints = (0..=FIT_SAMPLES)
                    .map(|i| {
                        let x = lo + i as f64 * step;
                        [x, fit.eval(x)]
                    })
                    .collect();
                plot_ui.line(
                    Line::new(curve)
                        .name("Gaussian fit")
                        .color(color::FIT)
                        .width(2.0),
                );
            }

            if plot_ui.response().clicked() {
                plot_ui.pointer_coordinate().map(|p| p.x)
            } else {
                None
            }
        })
        .inner;

    if let Some(x) = clicked_x {
        if let Some(n) = state.select_nearest(x) {
            state.log(format!("Selected peak {}", n + 1));
        }
    }
}
