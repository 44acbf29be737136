use eframe::egui::{self, RichText, ScrollArea, Ui};

use data_sweeper::data::chart::chart_data;
use data_sweeper::data::cleaning::{CleaningOperation, ConstantColumnPolicy};
use data_sweeper::data::export::ExportFormat;

use crate::color::status_color;
use crate::state::{AppState, PREVIEW_ROWS, StatusMessage};
use crate::ui::{plot, preview};

// ---------------------------------------------------------------------------
// Left side panel – loaded files
// ---------------------------------------------------------------------------

/// Render the list of loaded files.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if state.files.is_empty() {
        ui.label("No file loaded.");
        if ui.button("Upload CSV or Excel files…").clicked() {
            open_files_dialog(state);
        }
        return;
    }

    let mut remove = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, file) in state.files.iter().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    let selected = state.selected == Some(i);
                    if ui.selectable_label(selected, &file.name).clicked() {
                        state.selected = Some(i);
                    }
                    ui.weak(format!("{:.2} KB", file.size_kb()));
                    if ui.small_button("✖").on_hover_text("Close file").clicked() {
                        remove = Some(i);
                    }
                });
            }

            if !state.load_errors.is_empty() {
                ui.separator();
                ui.strong("Skipped");
                for err in &state.load_errors {
                    ui.label(RichText::new(err).color(egui::Color32::RED));
                }
            }
        });

    if let Some(i) = remove {
        state.remove_file(i);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open files…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
        });

        ui.menu_button("Options", |ui: &mut Ui| {
            ui.label("Normalizing a constant column:");
            ui.radio_value(
                &mut state.constant_policy,
                ConstantColumnPolicy::Zero,
                "Set to 0",
            );
            ui.radio_value(
                &mut state.constant_policy,
                ConstantColumnPolicy::KeepOriginal,
                "Keep original values",
            );
        });

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(status_text(msg));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – the selected file
// ---------------------------------------------------------------------------

/// Preview, cleaning, chart and conversion for the selected file.
pub fn file_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(index) = state.selected.filter(|i| *i < state.files.len()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a CSV or Excel file to get started  (File → Open files…)");
        });
        return;
    };

    let mut clicked_op = None;
    let mut convert = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let file = &mut state.files[index];
            ui.label(RichText::new(format!("File: {}", file.name)).strong());
            ui.label(format!("Size: {:.2} KB", file.size_kb()));

            ui.add_space(6.0);
            ui.heading("Data Preview");
            preview::preview_table(ui, &file.table, PREVIEW_ROWS);

            ui.add_space(6.0);
            ui.heading("Data Cleaning Options");
            ui.checkbox(&mut file.cleaning_open, format!("Clean data for {}", file.name));
            if file.cleaning_open {
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    for op in CleaningOperation::ALL {
                        if ui.button(op.label()).clicked() {
                            clicked_op = Some(op);
                        }
                    }
                });
            }
            if let Some(msg) = &file.status {
                ui.label(status_text(msg));
            }

            ui.add_space(6.0);
            ui.heading("Data Visualization");
            ui.checkbox(&mut file.show_chart, format!("Show visualization for {}", file.name));
            if file.show_chart {
                match chart_data(&file.table) {
                    Ok(data) => plot::bar_chart(ui, &format!("chart_{index}"), &data),
                    Err(warning) => {
                        ui.label(status_text(&StatusMessage::Warning(format!(
                            "{warning} for visualization"
                        ))));
                    }
                }
            }

            ui.add_space(6.0);
            ui.heading("Conversion Options");
            ui.horizontal(|ui: &mut Ui| {
                ui.label(format!("Convert {} to:", file.name));
                for format in ExportFormat::ALL {
                    ui.radio_value(&mut file.export_format, format, format.label());
                }
            });
            if ui.button(format!("Convert {}", file.name)).clicked() {
                convert = true;
            }
        });

    if let Some(op) = clicked_op {
        state.apply(index, op);
    }
    if convert {
        save_converted(state, index);
    }
}

fn status_text(msg: &StatusMessage) -> RichText {
    let text = match msg {
        StatusMessage::Success(t) | StatusMessage::Warning(t) | StatusMessage::Error(t) => t,
    };
    RichText::new(text).color(status_color(msg))
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload CSV or Excel files")
        .add_filter("Tabular files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(paths) = files {
        log::info!("Uploading {} file(s)", paths.len());
        state.load_paths(paths);
    }
}

fn save_converted(state: &mut AppState, index: usize) {
    let Some(artifact) = state.export(index) else {
        return;
    };
    let format = state.files[index].export_format;

    let target = rfd::FileDialog::new()
        .set_title(format!("Download as {}", format.label()))
        .set_file_name(&artifact.file_name)
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    let Some(path) = target else {
        return;
    };
    let status = match std::fs::write(&path, artifact.bytes()) {
        Ok(()) => {
            log::info!("Saved {} ({})", path.display(), artifact.content_type);
            StatusMessage::Success(format!("Saved {}", path.display()))
        }
        Err(e) => {
            log::error!("Failed to save {}: {e}", path.display());
            StatusMessage::Error(format!("Failed to save {}: {e}", path.display()))
        }
    };
    state.files[index].status = Some(status);
}
