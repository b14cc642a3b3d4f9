//! Two-column spreadsheet that accumulates extracted fragments across runs.
//!
//! Every operation is a full load-modify-save cycle on the file at `path`.
//! Concurrent saves to the same path are not safe; the controller allows at
//! most one run at a time.

pub mod reader;
pub mod writer;

use crate::error::AddrexError;
use crate::events::{Event, EventSink};
use crate::scan::ExtractionResult;
use std::path::{Path, PathBuf};

pub const FILE_HEADER: &str = "PDF File";
pub const DEFAULT_DATA_HEADER: &str = "Extracted Data";
/// Header used by older exports of the address sheet.
pub const LEGACY_DATA_HEADER: &str = "Extracted Address";
pub const DEFAULT_SHEET_NAME: &str = "Extracted Data";
pub const DEFAULT_SPREADSHEET: &str = "addresses.xlsx";

/// Upper bound on a computed column width, in characters.
pub const MAX_COLUMN_WIDTH: usize = 50;
const WIDTH_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel date serial (days since 1899-12-30), written with a date format.
    Date(f64),
    /// Elapsed time in days, written with an `[h]:mm:ss` format.
    Duration(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The cell as it reads in a spreadsheet, used for width sizing.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            Cell::Number(f) => f.to_string(),
            Cell::Date(serial) => format_date(*serial),
            Cell::Duration(days) => format_duration(*days),
            Cell::Bool(true) => "TRUE".into(),
            Cell::Bool(false) => "FALSE".into(),
        }
    }
}

/// Serial 25569 is 1970-01-01 in the 1900 date system.
const UNIX_EPOCH_SERIAL: i64 = 25569;

fn format_date(serial: f64) -> String {
    let days = serial.floor() as i64 - UNIX_EPOCH_SERIAL;
    let (y, m, d) = civil_from_days(days);
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    if seconds == 0 {
        format!("{y:04}-{m:02}-{d:02}")
    } else {
        format!("{y:04}-{m:02}-{d:02} {:02}:{:02}", seconds / 3600, seconds % 3600 / 60)
    }
}

fn format_duration(days: f64) -> String {
    let total = (days * 86_400.0).round() as i64;
    format!("{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

/// Proleptic Gregorian date for a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// One worksheet. `rows[0]` is spreadsheet row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// True when no cell holds a value.
    pub fn is_empty(&self) -> bool {
        self.max_row() == 0
    }

    /// 1-based index of the last row holding a value, 0 for an empty sheet.
    pub fn max_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Number of columns up to the last one holding a value anywhere.
    pub fn max_column(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.iter().rposition(|c| !c.is_empty()))
            .map(|i| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// Cell at 1-based `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows.get(row - 1)?.get(col - 1)
    }

    /// Set the cell at 1-based `(row, col)`, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(row > 0 && col > 0);
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, Cell::Empty);
        }
        cells[col - 1] = cell;
    }

    /// Write `cells` on the row after the current last row. Returns that row.
    pub fn append_row(&mut self, cells: Vec<Cell>) -> usize {
        let row = self.max_row() + 1;
        for (i, cell) in cells.into_iter().enumerate() {
            self.set(row, i + 1, cell);
        }
        row
    }

    /// Width of each column as `min(longest + 2, 50)` characters.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut longest = vec![0usize; self.max_column()];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(longest.len()) {
                longest[i] = longest[i].max(cell.display().chars().count());
            }
        }
        longest
            .into_iter()
            .map(|len| (len + WIDTH_PADDING).min(MAX_COLUMN_WIDTH))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    /// The first sheet is the active one.
    pub sheets: Vec<Sheet>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Empty workbook with a single sheet.
    pub fn new() -> Self {
        Workbook {
            sheets: vec![Sheet::new(DEFAULT_SHEET_NAME)],
        }
    }

    /// Fresh workbook holding only the header row.
    pub fn with_header(data_header: &str) -> Self {
        let mut wb = Self::new();
        write_header(wb.active_mut(), data_header);
        wb
    }

    pub fn open(path: &Path) -> Result<Self, AddrexError> {
        reader::read_workbook(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), AddrexError> {
        writer::write_workbook(self, path)
    }

    pub fn active(&self) -> &Sheet {
        &self.sheets[0]
    }

    pub fn active_mut(&mut self) -> &mut Sheet {
        if self.sheets.is_empty() {
            self.sheets.push(Sheet::new(DEFAULT_SHEET_NAME));
        }
        &mut self.sheets[0]
    }
}

fn write_header(sheet: &mut Sheet, data_header: &str) {
    sheet.set(1, 1, Cell::text(FILE_HEADER));
    sheet.set(1, 2, Cell::text(data_header));
}

/// Persistent sink for `(filename, fragment)` rows.
#[derive(Debug, Clone)]
pub struct SpreadsheetSink {
    path: PathBuf,
    data_header: String,
}

impl SpreadsheetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SpreadsheetSink {
            path: path.into(),
            data_header: DEFAULT_DATA_HEADER.into(),
        }
    }

    pub fn with_header(mut self, data_header: impl Into<String>) -> Self {
        self.data_header = data_header.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data_header(&self) -> &str {
        &self.data_header
    }

    /// Append one row per entry after any existing content and save.
    ///
    /// Returns `false` on any I/O or format error; the detail goes to `events`.
    pub fn save(&self, entries: &ExtractionResult, events: &dyn EventSink) -> bool {
        let result = self.append_rows(
            |_| {
                entries
                    .iter()
                    .map(|(name, fragment)| (name.clone(), fragment.clone()))
            },
            events,
        );
        self.finish(result, entries.len(), events)
    }

    /// Append raw address strings that have no originating file. The first
    /// column is filled with `Appended_<row>`.
    pub fn append_unsourced(&self, addresses: &[String], events: &dyn EventSink) -> bool {
        let kept: Vec<&str> = addresses
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        let count = kept.len();
        let result = self.append_rows(
            |first_row| {
                kept.iter()
                    .enumerate()
                    .map(move |(i, a)| (format!("Appended_{}", first_row + i), a.to_string()))
            },
            events,
        );
        self.finish(result, count, events)
    }

    /// Replace the file with a workbook holding only the header row.
    ///
    /// Destructive; callers confirm with the user first.
    pub fn clear(&self, events: &dyn EventSink) -> bool {
        match Workbook::with_header(&self.data_header).save(&self.path) {
            Ok(()) => {
                events.emit(Event::SheetCleared {
                    path: self.path.clone(),
                });
                true
            }
            Err(e) => {
                events.emit(Event::SaveFailed {
                    path: self.path.clone(),
                    error: e.to_string(),
                });
                false
            }
        }
    }

    fn finish(&self, result: Result<(), AddrexError>, count: usize, events: &dyn EventSink) -> bool {
        match result {
            Ok(()) => {
                events.emit(Event::RowsSaved {
                    count,
                    path: self.path.clone(),
                });
                true
            }
            Err(e) => {
                events.emit(Event::SaveFailed {
                    path: self.path.clone(),
                    error: e.to_string(),
                });
                false
            }
        }
    }

    /// Load (or create), append the rows produced by `rows` and save.
    /// `rows` receives the 1-based row number of the first appended row.
    fn append_rows<F, I>(&self, rows: F, events: &dyn EventSink) -> Result<(), AddrexError>
    where
        F: FnOnce(usize) -> I,
        I: Iterator<Item = (String, String)>,
    {
        let mut wb = self.load_or_create(events);
        let data_header = self.data_header.clone();
        let name_taken = wb.sheets.iter().any(|s| s.name == DEFAULT_SHEET_NAME);
        let sheet = wb.active_mut();
        if sheet.name == "Sheet" && !name_taken {
            sheet.name = DEFAULT_SHEET_NAME.into();
        }

        if sheet.is_empty() {
            write_header(sheet, &data_header);
        }
        let first_row = sheet.max_row() + 1;

        for (name, value) in rows(first_row) {
            sheet.append_row(vec![Cell::Text(name), Cell::Text(value)]);
        }

        log::debug!(
            "writing {} rows to {} (widths {:?})",
            sheet.max_row(),
            self.path.display(),
            sheet.column_widths()
        );
        wb.save(&self.path)
    }

    fn load_or_create(&self, events: &dyn EventSink) -> Workbook {
        if !self.path.exists() {
            events.emit(Event::WorkbookCreated {
                path: self.path.clone(),
            });
            return Workbook::new();
        }
        match Workbook::open(&self.path) {
            Ok(wb) => {
                events.emit(Event::WorkbookLoaded {
                    path: self.path.clone(),
                });
                wb
            }
            Err(e) => {
                events.emit(Event::WorkbookUnreadable {
                    path: self.path.clone(),
                    error: e.to_string(),
                });
                Workbook::new()
            }
        }
    }
}
