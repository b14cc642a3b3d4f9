use crate::config::AppConfig;
use crate::error::AddrexError;
use crate::events::{Event, EventSink};
use crate::extraction::PdfExtractor;
use crate::print::{print_all, PrintBackend, PrintSummary};
use crate::run::{CancellationToken, RunState};
use crate::scan::{files_from_paths, scan_files, scan_folder, ScanOptions, ScanReport};
use crate::spreadsheet::SpreadsheetSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub report: ScanReport,
    /// Workbook the entries were appended to, when a save happened and succeeded.
    pub saved_to: Option<PathBuf>,
    pub save_failed: bool,
}

/// Owns the run state and starts at most one background worker at a time.
#[derive(Debug, Clone)]
pub struct Controller {
    config: AppConfig,
    state: RunState,
}

impl Controller {
    pub fn new(config: AppConfig) -> Self {
        Controller {
            config,
            state: RunState::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    /// Ask the running worker to stop at the next file boundary.
    pub fn stop(&self, events: &dyn EventSink) {
        if self.state.is_processing() {
            self.state.request_stop();
            events.emit(Event::StopRequested);
        }
    }

    /// Scan `folder` on a worker thread and save the results.
    pub fn start_extraction(
        &self,
        folder: PathBuf,
        extractor: Arc<dyn PdfExtractor>,
        events: Arc<dyn EventSink>,
    ) -> Result<JoinHandle<Result<ExtractionOutcome, AddrexError>>, AddrexError> {
        let guard = self.state.try_begin()?;
        let token = guard.token();
        let config = self.config.clone();

        let handle = std::thread::Builder::new()
            .name("addrex-extract".into())
            .spawn(move || {
                let _guard = guard;
                run_extraction(&folder, &config, extractor.as_ref(), events.as_ref(), &token)
            })?;
        Ok(handle)
    }

    /// Scan individually chosen `files` on a worker thread and save the results.
    pub fn start_extraction_files(
        &self,
        files: Vec<PathBuf>,
        extractor: Arc<dyn PdfExtractor>,
        events: Arc<dyn EventSink>,
    ) -> Result<JoinHandle<ExtractionOutcome>, AddrexError> {
        let guard = self.state.try_begin()?;
        let token = guard.token();
        let config = self.config.clone();

        let handle = std::thread::Builder::new()
            .name("addrex-extract".into())
            .spawn(move || {
                let _guard = guard;
                run_extraction_files(&files, &config, extractor.as_ref(), events.as_ref(), &token)
            })?;
        Ok(handle)
    }

    /// Print `files` on a worker thread.
    pub fn start_printing(
        &self,
        files: Vec<PathBuf>,
        mut backend: Box<dyn PrintBackend>,
        events: Arc<dyn EventSink>,
    ) -> Result<JoinHandle<PrintSummary>, AddrexError> {
        let guard = self.state.try_begin()?;
        let token = guard.token();
        let options = self.config.print.options();

        let handle = std::thread::Builder::new()
            .name("addrex-print".into())
            .spawn(move || {
                let _guard = guard;
                print_all(&files, backend.as_mut(), &options, events.as_ref(), &token)
            })?;
        Ok(handle)
    }
}

/// Scan, then append whatever was extracted to the configured workbook.
///
/// Nothing is saved when the run was stopped or produced no entries.
pub fn run_extraction(
    folder: &Path,
    config: &AppConfig,
    extractor: &dyn PdfExtractor,
    events: &dyn EventSink,
    cancel: &CancellationToken,
) -> Result<ExtractionOutcome, AddrexError> {
    let options = ScanOptions {
        recursive: config.recursive,
    };
    let report = scan_folder(folder, &options, extractor, events, cancel)?;

    Ok(save_report(report, config, events))
}

/// Same as [`run_extraction`] for files picked one by one. Rows are keyed by
/// file name.
pub fn run_extraction_files(
    files: &[PathBuf],
    config: &AppConfig,
    extractor: &dyn PdfExtractor,
    events: &dyn EventSink,
    cancel: &CancellationToken,
) -> ExtractionOutcome {
    let report = scan_files(&files_from_paths(files), extractor, events, cancel);
    save_report(report, config, events)
}

fn save_report(
    report: ScanReport,
    config: &AppConfig,
    events: &dyn EventSink,
) -> ExtractionOutcome {
    let mut outcome = ExtractionOutcome {
        report,
        saved_to: None,
        save_failed: false,
    };
    if outcome.report.stopped {
        return outcome;
    }
    if outcome.report.entries.is_empty() {
        if outcome.report.total > 0 {
            events.emit(Event::NothingExtracted);
        }
        return outcome;
    }

    let sink =
        SpreadsheetSink::new(&config.spreadsheet_path).with_header(config.header_label.clone());
    if sink.save(&outcome.report.entries, events) {
        outcome.saved_to = Some(config.spreadsheet_path.clone());
    } else {
        outcome.save_failed = true;
    }
    outcome
}
