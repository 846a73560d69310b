use std::path::Path;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use rusty_xrd::data::loader::{self, SCAN_EXTENSIONS};
use rusty_xrd::export::{self, ExportArtifact};
use rusty_xrd::state::{AppState, ViewRequest};

// ---------------------------------------------------------------------------
// Left side panel – processing controls
// ---------------------------------------------------------------------------

/// Render the left processing panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Processing");
    ui.separator();

    if state.series.is_none() {
        ui.label("No scan loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Smoothing ----
            ui.strong("Smoothing");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    DragValue::new(&mut state.settings.smoothing_window)
                        .range(1..=201)
                        .prefix("window "),
                );
                if ui.button("Smooth").clicked() {
                    state.apply_smoothing();
                }
            });

            // ---- Baseline ----
            ui.strong("Baseline");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    DragValue::new(&mut state.settings.baseline_degree)
                        .range(0..=6)
                        .prefix("degree "),
                );
                if ui.button("Subtract").clicked() {
                    state.subtract_baseline();
                }
            });
            if let Some(b) = &state.baseline {
                ui.small(format!("coefficients {:.4?}", b.coefficients));
            }
            if ui.button("Reset processing").clicked() {
                state.reset_processing();
            }
            ui.separator();

            // ---- Peaks ----
            ui.strong("Peaks");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    DragValue::new(&mut state.settings.threshold_factor)
                        .range(0.0..=50.0)
                        .speed(0.05)
                        .prefix("× mean "),
                );
                ui.add(
                    DragValue::new(&mut state.settings.min_distance)
                        .range(0..=1000)
                        .prefix("min dist "),
                );
            });
            if ui.button("Detect peaks").clicked() {
                state.detect_peaks();
            }
            peak_table(ui, state);
            ui.separator();

            // ---- Gaussian fit ----
            ui.strong("Gaussian fit");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    DragValue::new(&mut state.settings.fit_window_radius)
                        .range(1..=1000)
                        .prefix("radius "),
                );
                ui.add(
                    DragValue::new(&mut state.settings.refine.iterations)
                        .range(0..=100_000)
                        .prefix("iter "),
                );
            });
            ui.add(
                DragValue::new(&mut state.settings.refine.learning_rate)
                    .range(0.0..=1.0)
                    .speed(0.001)
                    .prefix("rate "),
            );
            let can_fit = state.selected.is_some();
            if ui
                .add_enabled(can_fit, egui::Button::new("Fit selected peak"))
                .clicked()
            {
                state.fit_selected();
            }
            if let Some(fit) = state.selected.and_then(|s| s.fit) {
                ui.label(RichText::new(fit.to_string()).color(color::FIT));
                ui.small(format!("FWHM {:.4}", fit.fwhm()));
            }
        });
}

/// Clickable list of detected peaks.
fn peak_table(ui: &mut Ui, state: &mut AppState) {
    if state.peaks.is_empty() {
        ui.label("No peaks detected.");
        return;
    }

    let rows: Vec<(usize, f64, f64)> = state
        .peaks
        .iter()
        .map(|p| (p.index, state.peak_x(p).unwrap_or(f64::NAN), p.intensity))
        .collect();
    let selected_index = state.selected.map(|s| s.peak.index);
    let colours = color::peak_palette(rows.len());
    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .sense(egui::Sense::click())
        .max_scroll_height(180.0)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("2θ");
            });
            header.col(|ui| {
                ui.strong("Intensity");
            });
        })
        .body(|mut body| {
            for (n, &(index, x, y)) in rows.iter().enumerate() {
                body.row(18.0, |mut row| {
                    row.set_selected(selected_index == Some(index));
                    row.col(|ui| {
                        ui.label(RichText::new(format!("{}", n + 1)).color(colours[n]));
                    });
                    row.col(|ui| {
                        ui.label(format!("{x:.3}"));
                    });
                    row.col(|ui| {
                        ui.label(format!("{y:.1}"));
                    });
                    if row.response().clicked() {
                        clicked = Some(n);
                    }
                });
            }
        });

    if let Some(n) = clicked {
        state.select_peak(n);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let loaded = state.series.is_some();
            if ui
                .add_enabled(loaded, egui::Button::new("Export session (JSON)…"))
                .clicked()
            {
                export_json_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(loaded, egui::Button::new("Export peaks (CSV)…"))
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(series)) = (&state.source_name, &state.series) {
            ui.label(format!("{name}: {} points, {} peaks", series.len(), state.peaks.len()));
        }

        ui.separator();

        if ui.button("Fit to data").clicked() {
            state.view_request = Some(ViewRequest::FitToData);
        }
        if ui.button("Reset zoom").clicked() {
            state.view_request = Some(ViewRequest::ResetZoom);
        }
        if ui.selectable_label(state.show_grid, "Grid").clicked() {
            state.show_grid = !state.show_grid;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – activity log
// ---------------------------------------------------------------------------

pub fn activity_log(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for line in &state.activity {
                ui.monospace(line);
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open diffraction scan")
        .add_filter("Scan files", SCAN_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        load_path(state, &path);
    }
}

/// Load a scan into the session, reporting failures in the status line.
pub fn load_path(state: &mut AppState, path: &Path) {
    match loader::load_file(path) {
        Ok(series) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            state.set_series(name, series);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_json_dialog(state: &mut AppState) {
    let Some(artifact) = ExportArtifact::from_state(state) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export session")
        .set_file_name("session.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };
    match artifact.save_json(&path) {
        Ok(()) => state.log(format!("Exported session to {}", path.display())),
        Err(e) => report_export_error(state, e),
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export peak table")
        .set_file_name("peaks.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    match export::save_peak_table(state, &path) {
        Ok(()) => state.log(format!("Exported peak table to {}", path.display())),
        Err(e) => report_export_error(state, e),
    }
}

fn report_export_error(state: &mut AppState, e: anyhow::Error) {
    log::error!("Export failed: {e:#}");
    state.status_message = Some(format!("Export failed: {e:#}"));
}
