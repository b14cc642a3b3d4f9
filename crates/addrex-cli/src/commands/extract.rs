use addrex_core::config::AppConfig;
use addrex_core::error::AddrexError;
use addrex_core::extraction::lopdf_text::LopdfExtractor;
use addrex_core::extraction::pdftotext::PdftotextExtractor;
use addrex_core::extraction::PdfExtractor;
use addrex_core::{Controller, ExtractionOutcome};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::output::{self, Progress};
use crate::Backend;

pub fn run(
    inputs: Vec<PathBuf>,
    recursive: bool,
    out: Option<PathBuf>,
    backend: Backend,
    mut config: AppConfig,
    progress: Progress,
) -> Result<(), AddrexError> {
    if recursive {
        config.recursive = true;
    }
    if let Some(out) = out {
        config.spreadsheet_path = out;
    }

    let extractor = select_backend(backend)?;
    log::info!("extracting text with {}", extractor.backend_name());

    let controller = Controller::new(config);
    let (tx, rx) = mpsc::channel();
    let events = Arc::new(tx);

    // A single folder keeps folder semantics: nested keys, "no PDF files" notice.
    let worker = match inputs.as_slice() {
        [folder] if folder.is_dir() => {
            Worker::Folder(controller.start_extraction(folder.clone(), extractor, events)?)
        }
        _ => {
            let files = super::collect_pdfs(&inputs, controller.config().recursive)?;
            if files.is_empty() {
                eprintln!("No PDF files to extract from.");
                return Ok(());
            }
            Worker::Files(controller.start_extraction_files(files, extractor, events)?)
        }
    };
    output::watch_for_stop(controller.clone(), progress);
    output::drain(rx, progress);

    let panicked =
        |_: Box<dyn std::any::Any + Send>| AddrexError::Aborted("extraction worker panicked".into());
    let outcome = match worker {
        Worker::Folder(handle) => handle.join().map_err(panicked)??,
        Worker::Files(handle) => handle.join().map_err(panicked)?,
    };

    if outcome.save_failed {
        return Err(AddrexError::WorkbookWrite(format!(
            "could not save {} entries to {}",
            outcome.report.entries.len(),
            controller.config().spreadsheet_path.display()
        )));
    }
    if let Some(path) = outcome.saved_to {
        println!(
            "Extracted {} address(es) into {}",
            outcome.report.entries.len(),
            path.display()
        );
    }
    Ok(())
}

enum Worker {
    Folder(JoinHandle<Result<ExtractionOutcome, AddrexError>>),
    Files(JoinHandle<ExtractionOutcome>),
}

fn select_backend(backend: Backend) -> Result<Arc<dyn PdfExtractor>, AddrexError> {
    match backend {
        Backend::Pdftotext => {
            if !PdftotextExtractor::is_available() {
                return Err(AddrexError::PdftotextNotFound);
            }
            Ok(Arc::new(PdftotextExtractor::new()))
        }
        Backend::Lopdf => Ok(Arc::new(LopdfExtractor::new())),
        Backend::Auto if PdftotextExtractor::is_available() => {
            Ok(Arc::new(PdftotextExtractor::new()))
        }
        Backend::Auto => {
            log::warn!("pdftotext not found on PATH, falling back to the built-in PDF reader");
            Ok(Arc::new(LopdfExtractor::new()))
        }
    }
}
