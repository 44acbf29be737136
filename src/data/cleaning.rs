use std::fmt;

use super::error::SweepWarning;
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Operation catalogue and reporting
// ---------------------------------------------------------------------------

/// The fixed set of cleaning steps offered for a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningOperation {
    RemoveDuplicates,
    FillMissing,
    RemoveEmptyRows,
    Normalize,
}

impl CleaningOperation {
    pub const ALL: [CleaningOperation; 4] = [
        CleaningOperation::RemoveDuplicates,
        CleaningOperation::FillMissing,
        CleaningOperation::RemoveEmptyRows,
        CleaningOperation::Normalize,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            CleaningOperation::RemoveDuplicates => "Remove Duplicates",
            CleaningOperation::FillMissing => "Fill Missing Values",
            CleaningOperation::RemoveEmptyRows => "Remove Empty Rows",
            CleaningOperation::Normalize => "Normalize Numeric Data",
        }
    }

    /// Run this operation on `table` in place.
    pub fn apply(self, table: &mut Table, policy: ConstantColumnPolicy) -> OperationReport {
        let report = match self {
            CleaningOperation::RemoveDuplicates => remove_duplicates(table),
            CleaningOperation::FillMissing => fill_missing(table),
            CleaningOperation::RemoveEmptyRows => remove_empty_rows(table),
            CleaningOperation::Normalize => normalize(table, policy),
        };
        match &report.status {
            OperationStatus::Success => log::info!("{report}"),
            OperationStatus::Warning(w) => log::warn!("{}: {w}", self.label()),
        }
        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Warning(SweepWarning),
}

/// Outcome of one cleaning step, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    pub operation: CleaningOperation,
    pub status: OperationStatus,
    pub rows_removed: usize,
    pub cells_changed: usize,
}

impl OperationReport {
    fn success(operation: CleaningOperation) -> Self {
        OperationReport {
            operation,
            status: OperationStatus::Success,
            rows_removed: 0,
            cells_changed: 0,
        }
    }

    fn warning(operation: CleaningOperation, warning: SweepWarning) -> Self {
        OperationReport {
            status: OperationStatus::Warning(warning),
            ..OperationReport::success(operation)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let OperationStatus::Warning(w) = &self.status {
            if self.cells_changed == 0 {
                return write!(f, "{w}");
            }
        }
        match self.operation {
            CleaningOperation::RemoveDuplicates => {
                write!(f, "Duplicates removed! ({} rows dropped)", self.rows_removed)
            }
            CleaningOperation::FillMissing => {
                write!(f, "Missing values filled! ({} cells)", self.cells_changed)
            }
            CleaningOperation::RemoveEmptyRows => {
                write!(f, "Empty rows removed! ({} rows dropped)", self.rows_removed)
            }
            CleaningOperation::Normalize => {
                write!(f, "Numeric data normalized! ({} cells)", self.cells_changed)?;
                if let OperationStatus::Warning(w) = &self.status {
                    write!(f, " {w}")?;
                }
                Ok(())
            }
        }
    }
}

/// What normalization writes into a column whose min equals its max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstantColumnPolicy {
    /// Every present cell becomes `0.0`.
    #[default]
    Zero,
    /// The column is left as it is.
    KeepOriginal,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Drop rows identical to an earlier row, keeping the first occurrence.
pub fn remove_duplicates(table: &mut Table) -> OperationReport {
    let keep = table.duplicate_mask();
    let rows_removed = table.retain_rows(&keep);
    OperationReport {
        rows_removed,
        ..OperationReport::success(CleaningOperation::RemoveDuplicates)
    }
}

/// Replace gaps in numeric columns with the mean of the column's present
/// values. Means are taken before any cell is written.
pub fn fill_missing(table: &mut Table) -> OperationReport {
    let op = CleaningOperation::FillMissing;
    if table.numeric_columns().is_empty() {
        return OperationReport::warning(op, SweepWarning::EmptyColumnSet);
    }

    let mut cells_changed = 0;
    for column in table.columns_mut() {
        if !column.is_numeric() || column.missing_count() == 0 {
            continue;
        }
        let Some(fill) = mean(column.numeric_values()) else {
            // Nothing present to average over.
            continue;
        };
        for cell in column.values_mut() {
            if cell.is_missing() {
                *cell = CellValue::Float(fill);
                cells_changed += 1;
            }
        }
    }

    OperationReport {
        cells_changed,
        ..OperationReport::success(op)
    }
}

/// Drop rows where every cell is missing.
pub fn remove_empty_rows(table: &mut Table) -> OperationReport {
    let keep: Vec<bool> = table
        .rows()
        .map(|row| row.iter().any(|v| !v.is_missing()))
        .collect();
    let rows_removed = table.retain_rows(&keep);
    OperationReport {
        rows_removed,
        ..OperationReport::success(CleaningOperation::RemoveEmptyRows)
    }
}

/// Min-max scale every numeric column to `[0, 1]`. Gaps stay gaps.
pub fn normalize(table: &mut Table, policy: ConstantColumnPolicy) -> OperationReport {
    let op = CleaningOperation::Normalize;
    if table.numeric_columns().is_empty() {
        return OperationReport::warning(op, SweepWarning::EmptyColumnSet);
    }

    let mut cells_changed = 0;
    let mut constant = Vec::new();
    for column in table.columns_mut() {
        if !column.is_numeric() {
            continue;
        }
        let Some((min, max)) = min_max(column.numeric_values()) else {
            continue;
        };
        let range = max - min;
        let degenerate = range == 0.0 || !range.is_finite();
        if degenerate {
            constant.push(column.name().to_string());
            if policy == ConstantColumnPolicy::KeepOriginal {
                continue;
            }
        }
        for cell in column.values_mut() {
            let Some(v) = cell.as_f64() else { continue };
            let scaled = if degenerate {
                0.0
            } else {
                (v - min) / range
            };
            *cell = CellValue::Float(scaled);
            cells_changed += 1;
        }
    }

    let status = if constant.is_empty() {
        OperationStatus::Success
    } else {
        OperationStatus::Warning(SweepWarning::DegenerateRange { columns: constant })
    };
    OperationReport {
        operation: op,
        status,
        rows_removed: 0,
        cells_changed,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn f(v: f64) -> CellValue {
        CellValue::Float(v)
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    fn t(v: &str) -> CellValue {
        CellValue::Text(v.to_string())
    }

    const NA: CellValue = CellValue::Missing;

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut table = Table::from_rows(
            &["a", "b"],
            vec![vec![i(1), i(2)], vec![i(1), i(2)], vec![i(3), NA]],
        )
        .unwrap();

        let report = remove_duplicates(&mut table);

        assert!(report.is_success());
        assert_eq!(report.rows_removed, 1);
        let expected =
            Table::from_rows(&["a", "b"], vec![vec![i(1), i(2)], vec![i(3), NA]]).unwrap();
        assert_eq!(table, expected);
    }

    #[test]
    fn duplicates_compare_missing_cells_as_equal() {
        let mut table = Table::from_rows(
            &["a", "b"],
            vec![vec![t("x"), NA], vec![t("y"), NA], vec![t("x"), NA]],
        )
        .unwrap();
        remove_duplicates(&mut table);
        assert_eq!(table.column("a").unwrap().values(), &[t("x"), t("y")]);
    }

    #[test]
    fn remove_duplicates_twice_is_a_no_op() {
        let mut table = Table::from_rows(
            &["k"],
            vec![vec![t("b")], vec![t("a")], vec![t("b")], vec![t("a")]],
        )
        .unwrap();
        remove_duplicates(&mut table);
        let once = table.clone();
        let report = remove_duplicates(&mut table);
        assert_eq!(report.rows_removed, 0);
        assert_eq!(table, once);
        assert_eq!(table.column("k").unwrap().values(), &[t("b"), t("a")]);
    }

    #[test]
    fn fill_uses_mean_of_present_values() {
        let mut table = Table::new(vec![Column::new("b", vec![i(2), NA, i(4)])]).unwrap();

        let report = fill_missing(&mut table);

        assert!(report.is_success());
        assert_eq!(report.cells_changed, 1);
        assert_eq!(table.column("b").unwrap().values(), &[f(2.0), f(3.0), f(4.0)]);
    }

    #[test]
    fn fill_mean_is_taken_before_replacement() {
        let mut table =
            Table::new(vec![Column::new("x", vec![NA, i(1), NA, i(5), NA])]).unwrap();
        fill_missing(&mut table);
        assert_eq!(
            table.column("x").unwrap().values(),
            &[f(3.0), f(1.0), f(3.0), f(5.0), f(3.0)]
        );
    }

    #[test]
    fn fill_skips_text_and_all_missing_columns() {
        let mut table = Table::new(vec![
            Column::new("name", vec![t("a"), NA]),
            Column::new("empty", vec![NA, NA]),
            Column::new("n", vec![f(1.5), NA]),
        ])
        .unwrap();

        let report = fill_missing(&mut table);

        assert_eq!(report.cells_changed, 1);
        assert_eq!(table.column("name").unwrap().values(), &[t("a"), NA]);
        assert_eq!(table.column("empty").unwrap().values(), &[NA, NA]);
        assert_eq!(table.column("n").unwrap().values(), &[f(1.5), f(1.5)]);
    }

    #[test]
    fn fill_without_numeric_columns_warns() {
        let mut table = Table::new(vec![Column::new("s", vec![t("a"), NA])]).unwrap();
        let before = table.clone();

        let report = fill_missing(&mut table);

        assert_eq!(
            report.status,
            OperationStatus::Warning(SweepWarning::EmptyColumnSet)
        );
        assert_eq!(table, before);
        assert_eq!(report.to_string(), "No numeric columns found");
    }

    #[test]
    fn fill_leaves_complete_tables_alone() {
        let mut table = Table::from_rows(
            &["a", "b"],
            vec![vec![i(1), t("x")], vec![i(2), t("y")]],
        )
        .unwrap();
        let before = table.clone();
        let report = fill_missing(&mut table);
        assert_eq!(report.cells_changed, 0);
        assert_eq!(table, before);
    }

    #[test]
    fn empty_rows_are_dropped() {
        let mut table = Table::from_rows(
            &["a", "b"],
            vec![vec![i(1), NA], vec![NA, NA], vec![NA, t("z")], vec![NA, NA]],
        )
        .unwrap();

        let report = remove_empty_rows(&mut table);

        assert_eq!(report.rows_removed, 2);
        assert_eq!(table.n_rows(), 2);
        assert!(table.rows().all(|row| row.iter().any(|v| !v.is_missing())));
        assert_eq!(remove_empty_rows(&mut table).rows_removed, 0);
    }

    #[test]
    fn normalize_rescales_to_unit_interval() {
        let mut table = Table::new(vec![
            Column::new("v", vec![i(10), i(20), i(30)]),
            Column::new("label", vec![t("a"), t("b"), t("c")]),
        ])
        .unwrap();

        let report = normalize(&mut table, ConstantColumnPolicy::Zero);

        assert!(report.is_success());
        assert_eq!(report.cells_changed, 3);
        assert_eq!(table.column("v").unwrap().values(), &[f(0.0), f(0.5), f(1.0)]);
        assert_eq!(table.column("label").unwrap().values(), &[t("a"), t("b"), t("c")]);
    }

    #[test]
    fn normalize_keeps_gaps() {
        let mut table = Table::new(vec![Column::new("v", vec![i(2), NA, i(6)])]).unwrap();
        normalize(&mut table, ConstantColumnPolicy::Zero);
        assert_eq!(table.column("v").unwrap().values(), &[f(0.0), NA, f(1.0)]);
    }

    #[test]
    fn normalize_constant_column_maps_to_zero() {
        let mut table = Table::new(vec![Column::new("c", vec![i(5), i(5), i(5)])]).unwrap();

        let report = normalize(&mut table, ConstantColumnPolicy::Zero);

        assert_eq!(
            report.status,
            OperationStatus::Warning(SweepWarning::DegenerateRange {
                columns: vec!["c".to_string()]
            })
        );
        assert_eq!(table.column("c").unwrap().values(), &[f(0.0), f(0.0), f(0.0)]);
    }

    #[test]
    fn normalize_constant_column_can_be_kept() {
        let mut table = Table::new(vec![
            Column::new("c", vec![i(5), i(5)]),
            Column::new("v", vec![i(0), i(4)]),
        ])
        .unwrap();

        let report = normalize(&mut table, ConstantColumnPolicy::KeepOriginal);

        assert!(!report.is_success());
        assert_eq!(table.column("c").unwrap().values(), &[i(5), i(5)]);
        assert_eq!(table.column("v").unwrap().values(), &[f(0.0), f(1.0)]);
    }

    #[test]
    fn normalize_without_numeric_columns_warns() {
        let mut table = Table::new(vec![Column::new("s", vec![t("a")])]).unwrap();
        let report = normalize(&mut table, ConstantColumnPolicy::Zero);
        assert_eq!(
            report.status,
            OperationStatus::Warning(SweepWarning::EmptyColumnSet)
        );
    }

    #[test]
    fn apply_dispatches_by_operation() {
        let mut table = Table::from_rows(
            &["a"],
            vec![vec![i(1)], vec![i(1)], vec![NA]],
        )
        .unwrap();
        let report =
            CleaningOperation::RemoveDuplicates.apply(&mut table, ConstantColumnPolicy::Zero);
        assert_eq!(report.operation, CleaningOperation::RemoveDuplicates);
        assert_eq!(table.n_rows(), 2);

        let report =
            CleaningOperation::RemoveEmptyRows.apply(&mut table, ConstantColumnPolicy::Zero);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(table.column("a").unwrap().values(), &[f(1.0)]);
    }
}
