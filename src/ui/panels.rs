use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use survey_lens::data::fields;
use survey_lens::data::report::display_value;

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

fn filter_title(column: &str) -> &'static str {
    match column {
        fields::AGE_GROUP => "Age Group",
        fields::OCCUPATION => "Occupation",
        fields::GENDER => "Gender",
        fields::FAMILIARITY => "Familiarity",
        _ => "Other",
    }
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Global Filters");
    ui.label(RichText::new("Applied to every page").small().weak());
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Page selector ----
            ui.strong("Page");
            for page in Page::ALL {
                ui.selectable_value(&mut state.page, page, page.title());
            }
            ui.separator();

            // ---- Per-column filter widgets (collapsible) ----
            for col in fields::FILTERABLE {
                let Some(all_values) = dataset.unique_values.get(col) else {
                    continue;
                };

                let n_selected = state
                    .selection
                    .allowed(col)
                    .map_or(all_values.len(), |selected| selected.len());
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", filter_title(col));

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(col == fields::AGE_GROUP)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.selection.is_selected(col, val);
                            if ui.checkbox(&mut checked, display_value(val)).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.summary.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} responses loaded, {} match the filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.show_raw_data, "Show Raw Data")
            .clicked()
        {
            state.show_raw_data = !state.show_raw_data;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard summary")
        .set_file_name("survey_summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        state.export_summary(&path);
    }
}
