//! Minimal SpreadsheetML (xlsx) writer: shared strings, column widths and a
//! wrap-text style for multi-line cells.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AddrexError;
use crate::spreadsheet::{Cell, Sheet, Workbook};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Style index applied to text containing line breaks.
const WRAP_STYLE: usize = 1;
/// Built-in `m/d/yyyy` (numFmtId 14).
const DATE_STYLE: usize = 2;
/// Built-in `[h]:mm:ss` (numFmtId 46).
const DURATION_STYLE: usize = 3;

/// Write `wb` to `path`. The file is built next to the target and renamed into
/// place, so a failed write leaves any previous file intact.
pub fn write_workbook(wb: &Workbook, path: &Path) -> Result<(), AddrexError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    let file = write_package(wb, tmp.reopen()?)?;
    file.sync_all()?;
    if let Some(permissions) = target_permissions(path) {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| AddrexError::Io(e.error))?;
    Ok(())
}

/// Permissions the saved file should end up with: those of the file being
/// replaced, or a world-readable default for a new file. Temp files are
/// created owner-only.
fn target_permissions(path: &Path) -> Option<std::fs::Permissions> {
    if let Ok(meta) = std::fs::metadata(path) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

fn write_package<W: Write + std::io::Seek>(wb: &Workbook, out: W) -> Result<W, AddrexError> {
    let mut strings = IndexSet::new();
    let sheet_xml: Vec<String> = wb
        .sheets
        .iter()
        .map(|s| sheet_xml(s, &mut strings))
        .collect();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(out);

    let mut put = |name: &str, body: &str| -> Result<(), AddrexError> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types(wb.sheets.len()))?;
    put("_rels/.rels", &root_rels())?;
    put("xl/workbook.xml", &workbook_xml(wb))?;
    put("xl/_rels/workbook.xml.rels", &workbook_rels(wb.sheets.len()))?;
    put("xl/styles.xml", &styles_xml())?;
    put("xl/sharedStrings.xml", &shared_strings_xml(&strings))?;
    for (i, xml) in sheet_xml.iter().enumerate() {
        put(&format!("xl/worksheets/sheet{}.xml", i + 1), xml)?;
    }

    Ok(zip.finish()?)
}

/// Spreadsheet column name for a 1-based index: 1 -> A, 27 -> AA.
pub fn column_name(mut col: usize) -> String {
    let mut name = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        name.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Escape for XML text and drop control characters XML 1.0 cannot carry.
fn xml_text(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= ' ')
        .collect();
    escape(cleaned.as_str()).into_owned()
}

fn sheet_xml(sheet: &Sheet, strings: &mut IndexSet<String>) -> String {
    let max_row = sheet.max_row();
    let max_col = sheet.max_column();
    let mut xml = String::new();

    let _ = write!(
        xml,
        r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}" xmlns:r="{NS_REL}">"#
    );
    if max_row == 0 {
        xml.push_str(r#"<dimension ref="A1"/>"#);
    } else {
        let _ = write!(xml, r#"<dimension ref="A1:{}{}"/>"#, column_name(max_col), max_row);
    }

    let widths = sheet.column_widths();
    if !widths.is_empty() {
        xml.push_str("<cols>");
        for (i, width) in widths.iter().enumerate() {
            let _ = write!(
                xml,
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                i + 1,
                width
            );
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (r, row) in sheet.rows.iter().enumerate().take(max_row) {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let _ = write!(xml, r#"<row r="{}">"#, r + 1);
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c + 1), r + 1);
            match cell {
                Cell::Empty => {}
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) => {
                    let (idx, _) = strings.insert_full(s.clone());
                    let style = if s.contains('\n') {
                        format!(r#" s="{WRAP_STYLE}""#)
                    } else {
                        String::new()
                    };
                    let _ = write!(xml, r#"<c r="{reference}"{style} t="s"><v>{idx}</v></c>"#);
                }
                Cell::Number(f) => {
                    let _ = write!(xml, r#"<c r="{reference}"><v>{f}</v></c>"#);
                }
                Cell::Date(serial) => {
                    let _ = write!(xml, r#"<c r="{reference}" s="{DATE_STYLE}"><v>{serial}</v></c>"#);
                }
                Cell::Duration(days) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{reference}" s="{DURATION_STYLE}"><v>{days}</v></c>"#
                    );
                }
                Cell::Bool(b) => {
                    let _ = write!(xml, r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b));
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn shared_strings_xml(strings: &IndexSet<String>) -> String {
    let mut xml = String::new();
    let _ = write!(
        xml,
        r#"{XML_DECL}<sst xmlns="{NS_MAIN}" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    );
    for s in strings {
        let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, xml_text(s));
    }
    xml.push_str("</sst>");
    xml
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::new();
    let _ = write!(
        xml,
        concat!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        ),
        XML_DECL
    );
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(wb: &Workbook) -> String {
    let mut xml = String::new();
    let _ = write!(
        xml,
        r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#
    );
    for (i, sheet) in wb.sheets.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{1}" r:id="rId{1}"/>"#,
            xml_text(&sheet.name),
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::new();
    let _ = write!(xml, r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}">"#);
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{i}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_REL}/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    );
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_REL}/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 2
    );
    xml.push_str("</Relationships>");
    xml
}

fn styles_xml() -> String {
    format!(
        concat!(
            r#"{}<styleSheet xmlns="{}">"#,
            r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
            r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment vertical="top" wrapText="1"/></xf>"#,
            r#"<xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
            r#"<xf numFmtId="46" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            r#"</styleSheet>"#,
        ),
        XML_DECL, NS_MAIN
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(2), "B");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(703), "AAA");
    }

    #[test]
    fn xml_text_escapes_and_strips_controls() {
        assert_eq!(xml_text("A & B <c>"), "A &amp; B &lt;c&gt;");
        assert_eq!(xml_text("x\x0cy\nz"), "xy\nz");
    }

    #[test]
    fn sheet_xml_has_widths_and_shared_strings() {
        let mut sheet = Sheet::new("S");
        sheet.append_row(vec![Cell::text("PDF File"), Cell::text("Extracted Data")]);
        sheet.append_row(vec![Cell::text("a.pdf"), Cell::text("1 Road\nTown")]);
        let mut strings = IndexSet::new();
        let xml = sheet_xml(&sheet, &mut strings);

        assert!(xml.contains(r#"<dimension ref="A1:B2"/>"#));
        assert!(xml.contains(r#"<col min="1" max="1" width="10" customWidth="1"/>"#));
        assert!(xml.contains(r#"<col min="2" max="2" width="16" customWidth="1"/>"#));
        assert!(xml.contains(r#"<c r="B2" s="1" t="s"><v>3</v></c>"#));
        assert_eq!(strings.len(), 4);
    }

    #[test]
    fn empty_sheet_xml() {
        let mut strings = IndexSet::new();
        let xml = sheet_xml(&Sheet::new("S"), &mut strings);
        assert!(xml.contains("<sheetData></sheetData>"));
        assert!(!xml.contains("<cols>"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.xlsx");
        let wb = Workbook::with_header("Extracted Data");

        wb.save(&path).unwrap();
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), 0o644);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o664)).unwrap();
        wb.save(&path).unwrap();
        assert_eq!(mode(&path), 0o664);
    }
}
