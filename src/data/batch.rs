use super::error::SweepError;
use super::loader::load_bytes;
use super::model::Table;

/// A file handed over by the upload dialog.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            name: name.into(),
            bytes,
        }
    }
}

/// Result of loading one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub size_bytes: usize,
    pub result: Result<Table, SweepError>,
}

impl FileOutcome {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Every file of one upload action, in upload order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.loaded()
    }

    pub fn summary(&self) -> String {
        match self.skipped() {
            0 => format!("All {} files processed successfully!", self.outcomes.len()),
            n => format!("{} files loaded, {n} skipped", self.loaded()),
        }
    }
}

/// Decode a single upload, dispatching on the extension of `name`.
pub fn process_file(bytes: &[u8], name: &str) -> Result<Table, SweepError> {
    load_bytes(bytes, name)
}

/// Load every upload in order. A failing file is recorded and skipped; it
/// never stops the remaining files.
pub fn process_batch(uploads: impl IntoIterator<Item = Upload>) -> BatchReport {
    let outcomes = uploads
        .into_iter()
        .map(|upload| {
            let result = process_file(&upload.bytes, &upload.name);
            if let Err(e) = &result {
                log::warn!("Skipping '{}' ({}): {e}", upload.name, e.kind());
            }
            FileOutcome {
                size_bytes: upload.bytes.len(),
                name: upload.name,
                result,
            }
        })
        .collect();
    let report = BatchReport { outcomes };
    log::info!("{}", report.summary());
    report
}
