use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use data_sweeper::data::chart::ChartData;

use crate::color::generate_palette;

// ---------------------------------------------------------------------------
// Bar chart of the numeric columns
// ---------------------------------------------------------------------------

/// Render one stacked bar per row, one colour per numeric column.
/// Gaps contribute nothing to their row's stack.
pub fn bar_chart(ui: &mut Ui, id: &str, data: &ChartData) {
    let colors = generate_palette(data.series.len());

    let mut charts: Vec<BarChart> = Vec::with_capacity(data.series.len());
    for (series, color) in data.series.iter().zip(colors) {
        let bars: Vec<Bar> = series
            .values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                Bar::new(row as f64, v.unwrap_or(0.0))
                    .width(0.8)
                    .name(format!("{} [{row}]", series.name))
            })
            .collect();

        let previous: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(&series.name)
            .color(color)
            .stack_on(&previous);
        charts.push(chart);
    }

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Row")
        .height(280.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
