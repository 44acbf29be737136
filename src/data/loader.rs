use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx};

use super::error::SweepError;
use super::model::{CellValue, Column, Table};

/// Cell texts read as missing values, matching the Pandas defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Supported formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Pick the format from a file name's extension (case-insensitive).
    /// Anything but `.csv` / `.xlsx` is rejected before parsing starts.
    pub fn from_file_name(name: &str) -> Result<Self, SweepError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            other => Err(SweepError::UnsupportedFormat {
                file: name.to_string(),
                extension: if other.is_empty() {
                    String::from("(none)")
                } else {
                    format!(".{other}")
                },
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode an uploaded byte stream into a [`Table`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma-delimited UTF-8 with a header row
/// * `.xlsx` – first worksheet, first row is the header
pub fn load_bytes(bytes: &[u8], name: &str) -> Result<Table, SweepError> {
    let format = FileFormat::from_file_name(name)?;
    let table = match format {
        FileFormat::Csv => load_csv(bytes),
        FileFormat::Xlsx => load_xlsx(bytes),
    }
    .map_err(|e| SweepError::parse(name, e))?;

    log::info!(
        "Loaded '{name}': {} rows × {} columns",
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Read a file from disk and decode it with [`load_bytes`].
pub fn load_file(path: &Path) -> Result<Table, SweepError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    // Reject the extension before touching the disk.
    FileFormat::from_file_name(&name)?;
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, &name)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Short records are padded with missing values; long records are rejected.
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if raw_headers.is_empty() || bytes.iter().all(u8::is_ascii_whitespace) {
        bail!("No columns to parse from file");
    }
    let headers = unique_headers(raw_headers);

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {}: expected {} fields, saw {}",
                row_no + 1,
                headers.len(),
                record.len()
            );
        }
        for (col_idx, slot) in raw.iter_mut().enumerate() {
            let field = record.get(col_idx).unwrap_or("");
            slot.push((!NA_TOKENS.contains(&field)).then(|| field.to_string()));
        }
    }

    let cells = raw.into_iter().map(typed_column).collect();
    build_table(headers, cells)
}

/// Type a whole column from its raw fields (`None` = missing). Numbers only
/// if every present field parses as one, booleans only if every present field
/// is a boolean token; otherwise every field is kept as the original text.
fn typed_column(raw: Vec<Option<String>>) -> Vec<CellValue> {
    let typed = |parse: fn(&str) -> Option<CellValue>| -> Option<Vec<CellValue>> {
        raw.iter()
            .map(|field| match field {
                None => Some(CellValue::Missing),
                Some(s) => parse(s),
            })
            .collect()
    };
    if let Some(cells) = typed(parse_number).or_else(|| typed(parse_bool)) {
        return cells;
    }
    raw.into_iter()
        .map(|field| field.map_or(CellValue::Missing, CellValue::Text))
        .collect()
}

fn parse_number(s: &str) -> Option<CellValue> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(CellValue::Integer(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| !f.is_nan())
        .map(CellValue::Float)
}

fn parse_bool(s: &str) -> Option<CellValue> {
    match s {
        "true" | "True" | "TRUE" => Some(CellValue::Bool(true)),
        "false" | "False" | "FALSE" => Some(CellValue::Bool(false)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an Excel 2007+ workbook held in memory.
fn load_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("opening Excel workbook")?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.context("reading first worksheet")?,
        None => bail!("Workbook contains no worksheet"),
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };

    let raw_headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    let headers = unique_headers(raw_headers);

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, slot) in cells.iter_mut().enumerate() {
            slot.push(row.get(col_idx).map_or(CellValue::Missing, excel_cell_value));
        }
    }

    build_table(headers, cells)
}

fn excel_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.is_nan() => CellValue::Missing,
        // Excel stores every number as a double; whole numbers read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if NA_TOKENS.contains(&s.as_str()) => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: {i}` and suffix repeats with `.1`, `.2`, ...
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{base}.{n}");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<CellValue>>) -> Result<Table> {
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Table::new(columns).context("assembling table")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: f64) -> CellValue {
        CellValue::Float(v)
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        assert_eq!(FileFormat::from_file_name("a.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("b.Xlsx").unwrap(), FileFormat::Xlsx);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_bytes(b"a,b\n1,2\n", "data.txt").unwrap_err();
        match err {
            SweepError::UnsupportedFormat { file, extension } => {
                assert_eq!(file, "data.txt");
                assert_eq!(extension, ".txt");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            FileFormat::from_file_name("README"),
            Err(SweepError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn csv_types_are_inferred_per_column() {
        let csv = b"id,score,name,flag\n1,2.5,alice,true\n2,,bob,false\n3,4,NA,\n";
        let table = load_bytes(csv, "people.csv").unwrap();

        assert_eq!(table.column_names(), vec!["id", "score", "name", "flag"]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column("id").unwrap().values(), &[i(1), i(2), i(3)]);
        assert_eq!(
            table.column("score").unwrap().values(),
            &[f(2.5), CellValue::Missing, f(4.0)]
        );
        assert_eq!(
            table.column("name").unwrap().values(),
            &[
                CellValue::Text("alice".into()),
                CellValue::Text("bob".into()),
                CellValue::Missing
            ]
        );
        assert_eq!(
            table.column("flag").unwrap().values(),
            &[CellValue::Bool(true), CellValue::Bool(false), CellValue::Missing]
        );
        let numeric: Vec<&str> = table.numeric_columns().iter().map(|c| c.name()).collect();
        assert_eq!(numeric, vec!["id", "score"]);
    }

    #[test]
    fn text_columns_keep_their_original_strings() {
        let csv = b"zip,flag,code\n02134,yes,1.0\nSW1A,true,1.00\n1.50,x,abc\n";
        let table = load_bytes(csv, "codes.csv").unwrap();
        let t = |s: &str| CellValue::Text(s.to_string());

        assert_eq!(
            table.column("zip").unwrap().values(),
            &[t("02134"), t("SW1A"), t("1.50")]
        );
        assert_eq!(
            table.column("flag").unwrap().values(),
            &[t("yes"), t("true"), t("x")]
        );
        assert_eq!(
            table.column("code").unwrap().values(),
            &[t("1.0"), t("1.00"), t("abc")]
        );
        assert!(table.numeric_columns().is_empty());
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_fail() {
        let table = load_bytes(b"a,b,c\n1,2\n", "short.csv").unwrap();
        assert_eq!(table.row(0), vec![&i(1), &i(2), &CellValue::Missing]);

        let err = load_bytes(b"a,b\n1,2,3\n", "long.csv").unwrap_err();
        match err {
            SweepError::Parse { file, .. } => assert_eq!(file, "long.csv"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn headers_are_made_unique() {
        let table = load_bytes(b"a,a,,a\n1,2,3,4\n", "dupes.csv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn header_only_csv_gives_empty_table() {
        let table = load_bytes(b"x,y\n", "empty.csv").unwrap();
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn empty_csv_is_a_parse_error() {
        assert!(matches!(
            load_bytes(b"", "nothing.csv"),
            Err(SweepError::Parse { .. })
        ));
    }

    #[test]
    fn bom_is_ignored() {
        let table = load_bytes(b"\xEF\xBB\xBFa,b\n1,2\n", "bom.csv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = load_bytes(b"a,b\n\xff\xfe,1\n", "latin.csv").unwrap_err();
        assert!(matches!(err, SweepError::Parse { .. }));
        assert!(err.to_string().contains("latin.csv"));
    }

    #[test]
    fn garbage_xlsx_is_a_parse_error() {
        let err = load_bytes(b"definitely not a zip archive", "broken.xlsx").unwrap_err();
        match err {
            SweepError::Parse { file, .. } => assert_eq!(file, "broken.xlsx"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.csv");
        std::fs::write(&path, "n\n1\n2\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.column("n").unwrap().values(), &[i(1), i(2)]);

        let missing = dir.path().join("absent.csv");
        assert!(matches!(load_file(&missing), Err(SweepError::Io(_))));
    }
}
