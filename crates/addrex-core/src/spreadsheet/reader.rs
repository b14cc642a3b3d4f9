use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::AddrexError;
use crate::spreadsheet::{Cell, Sheet, Workbook};

/// Load every sheet of an xlsx file into memory.
///
/// Cells keep their absolute positions, so a sheet whose data starts below
/// row 1 still appends after its real last row.
pub fn read_workbook(path: &Path) -> Result<Workbook, AddrexError> {
    let bytes = std::fs::read(path)?;
    let fail = |reason: String| AddrexError::WorkbookRead {
        path: path.to_path_buf(),
        reason,
    };

    let cursor = Cursor::new(bytes);
    let mut workbook = calamine::open_workbook_from_rs::<Xlsx<_>, _>(cursor)
        .map_err(|e| fail(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| fail(format!("sheet '{name}': {e}")))?;

        let mut sheet = Sheet::new(name);
        if let Some((row0, col0)) = range.start() {
            for (r, c, data) in range.used_cells() {
                let cell = to_cell(data);
                if !cell.is_empty() {
                    sheet.set(row0 as usize + r + 1, col0 as usize + c + 1, cell);
                }
            }
        }
        sheets.push(sheet);
    }

    if sheets.is_empty() {
        return Err(fail("workbook has no sheets".into()));
    }
    Ok(Workbook { sheets })
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Cell::Duration(dt.as_f64()),
        Data::DateTime(dt) => Cell::Date(dt.as_f64()),
        other => Cell::Text(format!("{other}")),
    }
}
