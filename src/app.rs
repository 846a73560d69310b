use eframe::egui;

use crate::ui::{panels, plot};
use rusty_xrd::AppState;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyXrdApp {
    pub state: AppState,
}

impl eframe::App for RustyXrdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: activity log ----
        egui::TopBottomPanel::bottom("activity_log")
            .default_height(110.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::activity_log(ui, &self.state);
            });

        // ---- Left side panel: processing ----
        egui::SidePanel::left("processing_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::scan_plot(ui, &mut self.state);
        });
    }
}
