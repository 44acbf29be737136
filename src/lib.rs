//! Load, clean, chart and convert small tabular files.
//!
//! The [`data`] module is the whole core: it has no UI dependency and every
//! operation is a plain function over a [`data::model::Table`].

pub mod data;

pub use data::batch::{BatchReport, FileOutcome, Upload, process_batch, process_file};
pub use data::chart::{ChartData, ChartSeries, chart_data};
pub use data::cleaning::{
    CleaningOperation, ConstantColumnPolicy, OperationReport, OperationStatus, fill_missing,
    normalize, remove_duplicates, remove_empty_rows,
};
pub use data::error::{SweepError, SweepWarning};
pub use data::export::{ExportArtifact, ExportFormat, export_table};
pub use data::loader::{FileFormat, load_bytes, load_file};
pub use data::model::{CellValue, Column, ColumnKind, Table};
