use thiserror::Error;

/// Failures that stop a single file from being loaded or exported.
///
/// None of these are fatal to a batch: [`crate::data::batch::process_batch`]
/// records them per file and carries on with the next upload.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The file extension is not one of the supported tabular formats.
    #[error("Unsupported file type '{extension}' for '{file}'")]
    UnsupportedFormat { file: String, extension: String },

    /// The file had a supported extension but its content could not be decoded.
    #[error("Failed to parse '{file}': {source:#}")]
    Parse {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    /// A table was assembled from columns of different lengths.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Serialising a table to the requested format failed.
    #[error("Failed to export as {format}: {source:#}")]
    Export {
        format: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SweepError {
    pub(crate) fn parse(file: &str, source: anyhow::Error) -> Self {
        SweepError::Parse {
            file: file.to_string(),
            source,
        }
    }

    /// Short category label for status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SweepError::UnsupportedFormat { .. } => "unsupported format",
            SweepError::Parse { .. } => "parse error",
            SweepError::ColumnLengthMismatch { .. } => "malformed table",
            SweepError::Export { .. } => "export error",
            SweepError::Io(_) => "I/O error",
        }
    }
}

/// Non-fatal conditions reported by cleaning and charting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepWarning {
    /// The table has no numeric column to work on.
    #[error("No numeric columns found")]
    EmptyColumnSet,

    /// Normalization met columns whose min equals max.
    #[error("Constant columns cannot be rescaled: {}", columns.join(", "))]
    DegenerateRange { columns: Vec<String> },
}
