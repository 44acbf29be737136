use std::path::PathBuf;

use data_sweeper::data::batch::{BatchReport, Upload, process_batch};
use data_sweeper::data::cleaning::{CleaningOperation, ConstantColumnPolicy, OperationStatus};
use data_sweeper::data::export::{ExportArtifact, ExportFormat, export_table};
use data_sweeper::data::model::Table;

/// Rows shown in the data preview.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Success(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Per-file state
// ---------------------------------------------------------------------------

/// One successfully loaded file and the widgets bound to it.
pub struct LoadedFile {
    pub name: String,
    pub size_bytes: usize,
    /// Kept across frames, so cleaning steps accumulate.
    pub table: Table,
    pub cleaning_open: bool,
    pub show_chart: bool,
    pub export_format: ExportFormat,
    pub status: Option<StatusMessage>,
}

impl LoadedFile {
    fn new(name: String, size_bytes: usize, table: Table) -> Self {
        Self {
            name,
            size_bytes,
            table,
            cleaning_open: false,
            show_chart: false,
            export_format: ExportFormat::default(),
            status: None,
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Files loaded so far, in upload order.
    pub files: Vec<LoadedFile>,

    /// Index into `files` of the file shown in the central panel.
    pub selected: Option<usize>,

    /// Per-file errors from the last upload.
    pub load_errors: Vec<String>,

    /// Batch-level message shown in the top bar.
    pub status_message: Option<StatusMessage>,

    /// What normalization does with constant columns.
    pub constant_policy: ConstantColumnPolicy,
}

impl AppState {
    /// Read the picked files from disk and load them as one batch.
    pub fn load_paths(&mut self, paths: Vec<PathBuf>) {
        let mut read_errors = Vec::new();
        let uploads: Vec<Upload> = paths
            .into_iter()
            .filter_map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                match std::fs::read(&path) {
                    Ok(bytes) => Some(Upload::new(name, bytes)),
                    Err(e) => {
                        log::error!("Failed to read {}: {e}", path.display());
                        read_errors.push(format!("{name}: {e}"));
                        None
                    }
                }
            })
            .collect();

        self.ingest(process_batch(uploads));
        self.load_errors.extend(read_errors);
        if !self.load_errors.is_empty() {
            self.status_message = Some(StatusMessage::Warning(format!(
                "{} file(s) could not be loaded",
                self.load_errors.len()
            )));
        }
    }

    /// Keep every loaded table; collect the errors for display.
    pub fn ingest(&mut self, report: BatchReport) {
        self.load_errors.clear();
        let summary = report.summary();
        let first_new = self.files.len();

        for outcome in report.outcomes {
            match outcome.result {
                Ok(table) => {
                    self.files
                        .push(LoadedFile::new(outcome.name, outcome.size_bytes, table));
                }
                Err(e) => self.load_errors.push(e.to_string()),
            }
        }

        if self.files.len() > first_new {
            self.selected = Some(first_new);
        }
        self.status_message = Some(if self.load_errors.is_empty() {
            StatusMessage::Success(summary)
        } else {
            StatusMessage::Warning(summary)
        });
    }

    /// Run a cleaning step on file `index` and record its status.
    pub fn apply(&mut self, index: usize, op: CleaningOperation) {
        let policy = self.constant_policy;
        let Some(file) = self.files.get_mut(index) else {
            return;
        };
        let report = op.apply(&mut file.table, policy);
        let text = report.to_string();
        file.status = Some(match report.status {
            OperationStatus::Success => StatusMessage::Success(text),
            OperationStatus::Warning(_) => StatusMessage::Warning(text),
        });
    }

    /// Serialize file `index` in its chosen format.
    pub fn export(&mut self, index: usize) -> Option<ExportArtifact> {
        let file = self.files.get_mut(index)?;
        match export_table(&file.table, file.export_format, &file.name) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                log::error!("{e}");
                file.status = Some(StatusMessage::Error(e.to_string()));
                None
            }
        }
    }

    /// Forget file `index` and its table.
    pub fn remove_file(&mut self, index: usize) {
        if index >= self.files.len() {
            return;
        }
        self.files.remove(index);
        self.selected = match self.selected {
            _ if self.files.is_empty() => None,
            Some(s) if s > index => Some(s - 1),
            Some(s) if s == index => Some(index.min(self.files.len() - 1)),
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_sweeper::data::model::CellValue;

    fn state_with(files: &[(&str, &str)]) -> AppState {
        let mut state = AppState::default();
        let uploads = files
            .iter()
            .map(|(name, text)| Upload::new(*name, text.as_bytes().to_vec()))
            .collect::<Vec<_>>();
        state.ingest(process_batch(uploads));
        state
    }

    #[test]
    fn ingest_keeps_good_files_and_lists_errors() {
        let state = state_with(&[("a.csv", "x\n1\n"), ("notes.txt", "hi"), ("b.csv", "y\n2\n")]);

        assert_eq!(state.files.len(), 2);
        assert_eq!(state.load_errors.len(), 1);
        assert!(state.load_errors[0].contains("notes.txt"));
        assert_eq!(state.selected, Some(0));
        assert!(matches!(state.status_message, Some(StatusMessage::Warning(_))));
    }

    #[test]
    fn cleaning_steps_accumulate_on_the_stored_table() {
        let mut state = state_with(&[("d.csv", "a,b\n1,2\n1,2\n3,\n")]);

        state.apply(0, CleaningOperation::RemoveDuplicates);
        state.apply(0, CleaningOperation::FillMissing);

        let table = &state.files[0].table;
        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column("b").unwrap().values(),
            &[CellValue::Float(2.0), CellValue::Float(2.0)]
        );
        assert!(matches!(state.files[0].status, Some(StatusMessage::Success(_))));
    }

    #[test]
    fn warnings_surface_as_warning_status() {
        let mut state = state_with(&[("t.csv", "name\nann\n")]);
        state.apply(0, CleaningOperation::Normalize);
        assert_eq!(
            state.files[0].status,
            Some(StatusMessage::Warning("No numeric columns found".to_string()))
        );
    }

    #[test]
    fn export_uses_selected_format() {
        let mut state = state_with(&[("d.csv", "a\n1\n")]);
        state.files[0].export_format = ExportFormat::Xlsx;
        let artifact = state.export(0).unwrap();
        assert_eq!(artifact.file_name, "d_converted.xlsx");
    }

    #[test]
    fn removing_files_keeps_selection_valid() {
        let mut state = state_with(&[("a.csv", "x\n1\n"), ("b.csv", "x\n1\n")]);
        state.selected = Some(1);
        state.remove_file(0);
        assert_eq!(state.selected, Some(0));
        state.remove_file(0);
        assert_eq!(state.selected, None);
    }
}
