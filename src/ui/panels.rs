use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_mint::analysis::pivot::Aggregation;

use crate::state::{AppState, View, VALUE_COLUMNS};

// ---------------------------------------------------------------------------
// Left side panel – view options
// ---------------------------------------------------------------------------

/// Render the left options panel. Any change recomputes the derived views.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    if !state.has_results() && state.session.projections().is_none() {
        ui.label("No results loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Table ----
            ui.strong("Table");
            egui::ComboBox::from_id_salt("value_column")
                .selected_text(&state.value_column)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in VALUE_COLUMNS {
                        changed |= ui
                            .selectable_value(&mut state.value_column, col.to_string(), col)
                            .changed();
                    }
                });
            egui::ComboBox::from_id_salt("aggregation")
                .selected_text(state.aggregation.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for agg in Aggregation::ALL {
                        changed |= ui
                            .selectable_value(&mut state.aggregation, agg, agg.to_string())
                            .changed();
                    }
                });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Label token");
                changed |= ui
                    .add(egui::DragValue::new(&mut state.split_index).range(-10..=10))
                    .on_hover_text("Index of the '_'-separated file name token used as sample label; negative counts from the end")
                    .changed();
            });
            ui.separator();

            // ---- Heatmap ----
            ui.strong("Heatmap");
            let opts = &mut state.heatmap_options;
            changed |= ui.checkbox(&mut opts.matrix.normalized, "Normalized").changed();
            changed |= ui.checkbox(&mut opts.matrix.transposed, "Transposed").changed();
            changed |= ui.checkbox(&mut opts.matrix.correlated, "Correlation").changed();
            changed |= ui.checkbox(&mut opts.matrix.clustered, "Clustered").changed();
            ui.add_enabled_ui(opts.matrix.clustered, |ui: &mut Ui| {
                changed |= ui.checkbox(&mut opts.show_dendrogram, "Dendrogram").changed();
            });
            changed |= ui.checkbox(&mut opts.show_legend, "Legend").changed();
            changed |= ui
                .checkbox(&mut opts.legend_horizontal, "Horizontal legend")
                .changed();
            ui.separator();

            // ---- Peak shapes ----
            ui.strong("Peak shapes");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Columns");
                changed |= ui
                    .add(egui::DragValue::new(&mut state.trace_columns).range(1..=12))
                    .changed();
            });
            let trace_opts = &mut state.trace_options;
            changed |= ui.checkbox(&mut trace_opts.show_legend, "Legend").changed();
            changed |= ui
                .checkbox(&mut trace_opts.legend_horizontal, "Horizontal legend")
                .changed();

            let labels = state
                .session
                .projections()
                .map(|p| p.labels())
                .unwrap_or_default();
            if !labels.is_empty() {
                let current = state.selected_peak.clone().unwrap_or_default();
                egui::ComboBox::from_id_salt("selected_peak")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for label in &labels {
                            if ui.selectable_label(current == *label, label).clicked() {
                                state.selected_peak = Some(label.clone());
                                changed = true;
                            }
                        }
                    });
            }
        });

    if changed {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open results…").clicked() {
                open_results_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open projections…").clicked() {
                open_projections_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.has_results(), egui::Button::new("Export…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            if ui.selectable_label(state.view == view, view.title()).clicked() {
                state.view = view;
            }
        }

        ui.separator();

        if state.has_results() {
            ui.label(format!("{} result rows", state.session.results().len()));
        }

        if let Some(msg) = &state.config_warning {
            ui.label(RichText::new(msg).color(Color32::YELLOW));
        }
        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_results_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open results")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_results_file(&path);
    }
}

pub fn open_projections_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open retention-time projections")
        .add_filter("Supported files", &["json", "csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_projections_file(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    if let Some(dir) = rfd::FileDialog::new()
        .set_title("Export to folder")
        .pick_folder()
    {
        state.export_to(&dir);
    }
}
