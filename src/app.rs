use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, table};

/// Default locations matching the generator binaries.
const DEFAULT_CSV: &str = "data/players.csv";
const DEFAULT_VIEWS_DIR: &str = "output/json";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScoutBenchApp {
    pub state: AppState,
}

impl Default for ScoutBenchApp {
    fn default() -> Self {
        Self {
            state: AppState::new(PathBuf::from(DEFAULT_CSV), PathBuf::from(DEFAULT_VIEWS_DIR)),
        }
    }
}

impl eframe::App for ScoutBenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: ready lists + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: player table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let view = self.state.current_view();
            table::player_table(ui, &view);
        });
    }
}
