use super::error::SweepWarning;
use super::model::Table;

/// One numeric column ready for plotting; `None` marks a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The numeric sub-table handed to the bar chart, indexed by row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    pub n_rows: usize,
}

/// Extract every numeric column of `table` for charting. Read-only.
pub fn chart_data(table: &Table) -> Result<ChartData, SweepWarning> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Err(SweepWarning::EmptyColumnSet);
    }
    let series = numeric
        .into_iter()
        .map(|column| ChartSeries {
            name: column.name().to_string(),
            values: column.values().iter().map(|v| v.as_f64()).collect(),
        })
        .collect();
    Ok(ChartData {
        series,
        n_rows: table.n_rows(),
    })
}
