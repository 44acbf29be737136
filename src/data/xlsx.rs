//! Minimal Office Open XML writer: one worksheet, inline strings, no styles.
//!
//! The package holds exactly the parts a reader needs to locate the sheet:
//! `[Content_Types].xml`, the package and workbook relationships, the
//! workbook, and `xl/worksheets/sheet1.xml`.

use std::io::{self, Seek, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::model::{CellValue, Table};

pub const SHEET_NAME: &str = "Sheet1";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Write `table` as a single-sheet workbook. The header is row 1.
pub fn write_xlsx<W: Write + Seek>(table: &Table, out: W) -> zip::result::ZipResult<W> {
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, Vec<u8>); 5] = [
        ("[Content_Types].xml", content_types()?),
        ("_rels/.rels", package_rels()?),
        ("xl/workbook.xml", workbook()?),
        ("xl/_rels/workbook.xml.rels", workbook_rels()?),
        ("xl/worksheets/sheet1.xml", worksheet(table)?),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(&body)?;
    }
    zip.finish()
}

// ---------------------------------------------------------------------------
// Package parts
// ---------------------------------------------------------------------------

fn xml_writer() -> io::Result<Writer<Vec<u8>>> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(w)
}

fn empty(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
    let mut tag = BytesStart::new(name);
    for attr in attrs {
        tag.push_attribute(*attr);
    }
    w.write_event(Event::Empty(tag))
}

fn start(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
    let mut tag = BytesStart::new(name);
    for attr in attrs {
        tag.push_attribute(*attr);
    }
    w.write_event(Event::Start(tag))
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> io::Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
}

fn content_types() -> io::Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "Types", &[("xmlns", NS_TYPES)])?;
    empty(&mut w, "Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
    empty(&mut w, "Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    empty(
        &mut w,
        "Override",
        &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)],
    )?;
    empty(
        &mut w,
        "Override",
        &[("PartName", "/xl/worksheets/sheet1.xml"), ("ContentType", CT_WORKSHEET)],
    )?;
    end(&mut w, "Types")?;
    Ok(w.into_inner())
}

fn package_rels() -> io::Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    empty(
        &mut w,
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "xl/workbook.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

fn workbook() -> io::Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    start(&mut w, "sheets", &[])?;
    empty(
        &mut w,
        "sheet",
        &[("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    end(&mut w, "sheets")?;
    end(&mut w, "workbook")?;
    Ok(w.into_inner())
}

fn workbook_rels() -> io::Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    empty(
        &mut w,
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_WORKSHEET), ("Target", "worksheets/sheet1.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

// ---------------------------------------------------------------------------
// Worksheet
// ---------------------------------------------------------------------------

fn worksheet(table: &Table) -> io::Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "worksheet", &[("xmlns", NS_MAIN)])?;
    start(&mut w, "sheetData", &[])?;

    let header: Vec<CellValue> = table
        .column_names()
        .into_iter()
        .map(|name| CellValue::Text(name.to_string()))
        .collect();
    write_row(&mut w, 1, header.iter())?;

    for (i, row) in table.rows().enumerate() {
        write_row(&mut w, i + 2, row.into_iter())?;
    }

    end(&mut w, "sheetData")?;
    end(&mut w, "worksheet")?;
    Ok(w.into_inner())
}

fn write_row<'a>(
    w: &mut Writer<Vec<u8>>,
    row_number: usize,
    cells: impl Iterator<Item = &'a CellValue>,
) -> io::Result<()> {
    let r = row_number.to_string();
    start(w, "row", &[("r", r.as_str())])?;
    for (col, cell) in cells.enumerate() {
        let reference = format!("{}{row_number}", column_letters(col));
        match cell {
            CellValue::Missing => {}
            CellValue::Integer(i) => number_cell(w, &reference, &i.to_string())?,
            CellValue::Float(f) if f.is_finite() => number_cell(w, &reference, &format!("{f:?}"))?,
            CellValue::Float(f) => text_cell(w, &reference, &f.to_string())?,
            CellValue::Bool(b) => {
                start(w, "c", &[("r", reference.as_str()), ("t", "b")])?;
                value(w, if *b { "1" } else { "0" })?;
                end(w, "c")?;
            }
            CellValue::Text(s) => text_cell(w, &reference, s)?,
        }
    }
    end(w, "row")
}

fn number_cell(w: &mut Writer<Vec<u8>>, reference: &str, v: &str) -> io::Result<()> {
    start(w, "c", &[("r", reference)])?;
    value(w, v)?;
    end(w, "c")
}

fn text_cell(w: &mut Writer<Vec<u8>>, reference: &str, text: &str) -> io::Result<()> {
    start(w, "c", &[("r", reference), ("t", "inlineStr")])?;
    start(w, "is", &[])?;
    start(w, "t", &[("xml:space", "preserve")])?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    end(w, "t")?;
    end(w, "is")?;
    end(w, "c")
}

fn value(w: &mut Writer<Vec<u8>>, v: &str) -> io::Result<()> {
    start(w, "v", &[])?;
    w.write_event(Event::Text(BytesText::new(v)))?;
    end(w, "v")
}

/// Zero-based column index to spreadsheet letters: 0 → A, 25 → Z, 26 → AA.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_follow_spreadsheet_convention() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn worksheet_escapes_text_and_skips_missing_cells() {
        let table = Table::from_rows(
            &["name", "n"],
            vec![vec![CellValue::Text("a<b & c".into()), CellValue::Missing]],
        )
        .unwrap();
        let xml = String::from_utf8(worksheet(&table).unwrap()).unwrap();

        assert!(xml.contains("a&lt;b &amp; c"));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr">"#));
        assert!(!xml.contains(r#"r="B2""#));
    }
}
