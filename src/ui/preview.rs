use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use data_sweeper::data::model::{CellValue, Table};

/// Render the first `n` rows of `table` as a striped grid.
pub fn preview_table(ui: &mut Ui, table: &Table, n: usize) {
    let head = table.head(n);
    if head.n_cols() == 0 {
        ui.label("The file has no columns.");
        return;
    }

    ui.push_id("preview", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(TableColumn::auto().at_least(32.0))
            .columns(TableColumn::auto().at_least(60.0), head.n_cols())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for name in head.column_names() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, head.n_rows(), |mut row| {
                    let index = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.weak(index.to_string());
                    });
                    for cell in head.row(index) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(cell));
                        });
                    }
                });
            });
    });

    ui.weak(format!(
        "{} of {} rows × {} columns",
        head.n_rows(),
        table.n_rows(),
        table.n_cols()
    ));
}

fn cell_text(cell: &CellValue) -> RichText {
    match cell {
        CellValue::Missing => RichText::new("NaN").color(Color32::GRAY).italics(),
        other => RichText::new(other.to_string()),
    }
}
