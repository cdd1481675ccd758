use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::{display_name, CurrentView};

/// Columns shown in the main table, in display order. Columns missing from
/// the current view are skipped.
const DISPLAY_COLUMNS: &[&str] = &[
    "short_name",
    "overall",
    "potential",
    "age",
    "player_positions",
    "club_name",
    "nationality_name",
    "value_eur",
    "wage_eur",
];

/// Render the main player table for the current view, sorted descending by
/// overall rating.
pub fn player_table(ui: &mut Ui, view: &CurrentView) {
    ui.heading(&view.title);

    if view.visible.is_empty() {
        ui.label("No players found matching the criteria.");
        return;
    }

    ui.strong(format!("Total Players: {}", view.visible.len()));
    ui.add_space(4.0);

    let columns: Vec<&str> = DISPLAY_COLUMNS
        .iter()
        .copied()
        .filter(|c| view.dataset.has_column(c))
        .collect();

    let mut rows = view.visible.clone();
    rows.sort_by(|&a, &b| {
        let ka = view.dataset.records[a]
            .number("overall")
            .unwrap_or(f64::NEG_INFINITY);
        let kb = view.dataset.records[b]
            .number("overall")
            .unwrap_or(f64::NEG_INFINITY);
        kb.total_cmp(&ka)
    });

    let mut table = TableBuilder::new(ui).striped(true).resizable(true);
    for _ in &columns {
        table = table.column(Column::auto().at_least(60.0));
    }

    table
        .header(20.0, |mut header| {
            for col in &columns {
                header.col(|ui| {
                    ui.strong(display_name(col));
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &view.dataset.records[rows[row.index()]];
                for col in &columns {
                    row.col(|ui| {
                        ui.label(rec.get(col).to_string());
                    });
                }
            });
        });
}
