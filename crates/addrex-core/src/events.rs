//! Progress events emitted by the scanner, the spreadsheet sink and the
//! print dispatcher. The host decides how to render them.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BatchStarted { total: usize },
    NoFilesFound { folder: PathBuf },
    FileStarted { index: usize, total: usize, name: String },
    FileSucceeded { name: String },
    MarkersNotFound { name: String, reason: String },
    FileFailed { name: String, error: String },
    StopRequested,
    Stopped { processed: usize },
    BatchComplete { extracted: usize, skipped: usize, failed: usize },
    NothingExtracted,

    WorkbookLoaded { path: PathBuf },
    WorkbookCreated { path: PathBuf },
    WorkbookUnreadable { path: PathBuf, error: String },
    RowsSaved { count: usize, path: PathBuf },
    SaveFailed { path: PathBuf, error: String },
    SheetCleared { path: PathBuf },

    PrinterUnavailable { backend: String },
    PrintStarted { index: usize, total: usize, name: String },
    PrintSent { name: String },
    PrintTimedOut { name: String },
    PrintFailed { name: String, error: String },
    PrintComplete { succeeded: usize, failed: usize },
}

/// Coarse severity, used when events are forwarded to the `log` facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Event {
    pub fn severity(&self) -> Severity {
        match self {
            Event::FileFailed { .. }
            | Event::SaveFailed { .. }
            | Event::PrintFailed { .. }
            | Event::PrinterUnavailable { .. } => Severity::Error,
            Event::NoFilesFound { .. }
            | Event::MarkersNotFound { .. }
            | Event::WorkbookUnreadable { .. }
            | Event::PrintTimedOut { .. }
            | Event::NothingExtracted
            | Event::Stopped { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::BatchStarted { total } => write!(f, "Found {total} PDF files to process."),
            Event::NoFilesFound { folder } => {
                write!(f, "No PDF files found in {}.", folder.display())
            }
            Event::FileStarted { index, total, name } => {
                write!(f, "[{index}/{total}] Processing {name}...")
            }
            Event::FileSucceeded { name } => write!(f, "  extracted address from {name}"),
            Event::MarkersNotFound { name, reason } => {
                write!(f, "  no address in {name}: {reason}")
            }
            Event::FileFailed { name, error } => write!(f, "  error processing {name}: {error}"),
            Event::StopRequested => write!(f, "Stop requested..."),
            Event::Stopped { processed } => {
                write!(f, "Stopped by user after {processed} file(s).")
            }
            Event::BatchComplete {
                extracted,
                skipped,
                failed,
            } => write!(
                f,
                "Batch complete: {extracted} extracted, {skipped} without markers, {failed} failed."
            ),
            Event::NothingExtracted => write!(f, "No addresses found in any files."),
            Event::WorkbookLoaded { path } => {
                write!(f, "Loaded existing workbook: {}", path.display())
            }
            Event::WorkbookCreated { path } => {
                write!(f, "Creating new workbook: {}", path.display())
            }
            Event::WorkbookUnreadable { path, error } => write!(
                f,
                "Could not open {}, starting a new workbook: {error}",
                path.display()
            ),
            Event::RowsSaved { count, path } => {
                write!(f, "Saved {count} entries to {}", path.display())
            }
            Event::SaveFailed { path, error } => {
                write!(f, "Error saving {}: {error}", path.display())
            }
            Event::SheetCleared { path } => write!(f, "Cleared spreadsheet: {}", path.display()),
            Event::PrinterUnavailable { backend } => {
                write!(f, "{backend} is not available for printing")
            }
            Event::PrintStarted { index, total, name } => {
                write!(f, "[{index}/{total}] Printing {name}...")
            }
            Event::PrintSent { name } => write!(f, "  print job sent for {name}"),
            Event::PrintTimedOut { name } => {
                write!(f, "  print timeout for {name}, may still be processing")
            }
            Event::PrintFailed { name, error } => write!(f, "  print error for {name}: {error}"),
            Event::PrintComplete { succeeded, failed } => {
                write!(f, "Printing complete: {succeeded} succeeded, {failed} failed.")
            }
        }
    }
}

/// Receiver of progress events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

impl EventSink for Sender<Event> {
    fn emit(&self, event: Event) {
        // A host that hung up no longer cares about progress.
        let _ = self.send(event);
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        log::log!(event.severity().level(), "{event}");
    }
}

impl Severity {
    pub fn level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Rendered lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
