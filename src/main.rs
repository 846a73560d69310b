mod app;
mod color;
mod ui;

use std::path::PathBuf;

use app::RustyXrdApp;
use eframe::egui;
use rusty_xrd::{AppState, ProcessingSettings};

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = match ProcessingSettings::load() {
        Ok(settings) => AppState::with_settings(settings),
        Err(e) => {
            log::error!("Falling back to default settings: {e:#}");
            let mut state = AppState::default();
            state.status_message = Some(format!("Settings ignored: {e:#}"));
            state
        }
    };

    // Optional scan path on the command line.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        ui::panels::load_path(&mut state, &path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty XRD – Diffraction Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyXrdApp { state }))),
    )
}
