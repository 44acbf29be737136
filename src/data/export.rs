use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::Context;

use super::error::SweepError;
use super::model::{CellValue, Table};
use super::xlsx::write_xlsx;

/// Appended to the source file's stem to name the converted file.
pub const CONVERTED_SUFFIX: &str = "_converted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// A serialized table ready for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    buffer: Cursor<Vec<u8>>,
}

impl ExportArtifact {
    /// Reader over the serialized bytes, positioned at the start.
    pub fn reader(&mut self) -> &mut Cursor<Vec<u8>> {
        &mut self.buffer
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_inner()
    }
}

/// `{stem}_converted.{ext}` for a source file name.
pub fn output_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.to_string());
    format!("{stem}{CONVERTED_SUFFIX}.{}", format.extension())
}

/// Serialize `table` in `format`. No row index is written.
pub fn export_table(
    table: &Table,
    format: ExportFormat,
    source_name: &str,
) -> Result<ExportArtifact, SweepError> {
    let bytes = match format {
        ExportFormat::Csv => {
            let mut out = Vec::new();
            write_csv(table, &mut out).map(|_| out)
        }
        ExportFormat::Xlsx => write_xlsx(table, Cursor::new(Vec::new()))
            .map(Cursor::into_inner)
            .context("writing workbook"),
    }
    .map_err(|source| SweepError::Export {
        format: format.label(),
        source,
    })?;

    let file_name = output_file_name(source_name, format);
    log::info!(
        "Exported '{source_name}' as {file_name} ({} bytes)",
        bytes.len()
    );
    Ok(ExportArtifact {
        file_name,
        content_type: format.content_type(),
        buffer: Cursor::new(bytes),
    })
}

/// Write the header and every row as comma-separated UTF-8.
pub fn write_csv<W: Write>(table: &Table, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for (row_no, row) in table.rows().enumerate() {
        writer
            .write_record(row.into_iter().map(CellValue::to_text))
            .with_context(|| format!("writing CSV row {}", row_no + 1))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}
