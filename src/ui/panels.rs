use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{self, ControlSpec};
use crate::data::model::Dataset;
use crate::state::{display_name, AppState, ViewSelection};

// ---------------------------------------------------------------------------
// Left side panel – ready lists + filter controls
// ---------------------------------------------------------------------------

/// Render the left panel: named-view buttons on top, interactive filter
/// controls below.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Ready Player Lists");
    ui.separator();

    let mut clicked: Option<ViewSelection> = None;
    if ui
        .selectable_label(state.selection == ViewSelection::All, "ALL")
        .clicked()
    {
        clicked = Some(ViewSelection::All);
    }
    for name in &state.ready_lists {
        let selected = state.selection == ViewSelection::Named(name.clone());
        if ui.selectable_label(selected, display_name(name)).clicked() {
            clicked = Some(ViewSelection::Named(name.clone()));
        }
    }
    if let Some(selection) = clicked {
        state.select_view(selection);
    }

    ui.separator();
    ui.heading("Custom Filters (ALL Search)");

    let base = match &state.base {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for group in filter::control_groups(&base) {
                ui.add_space(4.0);
                ui.strong(group.title);
                for spec in &group.controls {
                    match spec {
                        ControlSpec::Range { column, min, max } => {
                            range_control(ui, state, &base, column, *min, *max);
                        }
                        ControlSpec::SteppedRange { column, min, max } => {
                            range_control(ui, state, &base, column, *min as f64, *max as f64);
                        }
                        ControlSpec::MultiSelect {
                            column, options, ..
                        } => {
                            multiselect_control(ui, state, column, options);
                        }
                    }
                }
            }
        });
}

/// Paired min/max sliders over an inclusive numeric range. All range
/// columns carry integer scales, so sliders snap to whole values.
fn range_control(ui: &mut Ui, state: &mut AppState, base: &Dataset, column: &str, min: f64, max: f64) {
    let (mut lo, mut hi) = state.filters.range_or_default(column, base);

    ui.label(format!("{}:", display_name(column)));
    let changed_lo = ui
        .add(egui::Slider::new(&mut lo, min..=max).integer().text("min"))
        .changed();
    let changed_hi = ui
        .add(egui::Slider::new(&mut hi, min..=max).integer().text("max"))
        .changed();

    if changed_lo || changed_hi {
        // Keep the pair ordered; the handle being dragged wins.
        if lo > hi {
            if changed_lo {
                hi = lo;
            } else {
                lo = hi;
            }
        }
        state.filters.set_range(column, lo, hi);
    }
}

/// Checkbox list over a column's observed unique values (collapsible).
fn multiselect_control(ui: &mut Ui, state: &mut AppState, column: &str, options: &[String]) {
    let n_selected = state.filters.selection_mut(column).len();
    let header_text = format!("{}  ({n_selected}/{})", display_name(column), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(column)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.filters.selection_mut(column).clear();
            }
            for opt in options {
                let mut checked = state.filters.selection_mut(column).contains(opt);
                if ui.checkbox(&mut checked, opt).changed() {
                    let selected = state.filters.selection_mut(column);
                    if checked {
                        selected.insert(opt.clone());
                    } else {
                        selected.remove(opt);
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(base) = &state.base {
            ui.label(format!("{} players loaded", base.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open player dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_dataset(path);
    }
}
