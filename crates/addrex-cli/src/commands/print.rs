use addrex_core::config::{AppConfig, PrintMode};
use addrex_core::error::AddrexError;
use addrex_core::print::headless::HeadlessBrowser;
use addrex_core::print::interactive::{InteractiveViewer, XdotoolKeys};
use addrex_core::print::{find_program, PrintBackend};
use addrex_core::Controller;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use crate::output::{self, Progress};
use crate::Mode;

pub fn run(
    inputs: Vec<PathBuf>,
    recursive: bool,
    mode: Option<Mode>,
    browser: Option<String>,
    mut config: AppConfig,
    progress: Progress,
) -> Result<(), AddrexError> {
    if let Some(mode) = mode {
        config.print.mode = match mode {
            Mode::Headless => PrintMode::Headless,
            Mode::Interactive => PrintMode::Interactive,
        };
    }

    let files = super::collect_pdfs(&inputs, recursive || config.recursive)?;
    if files.is_empty() {
        eprintln!("No PDF files to print.");
        return Ok(());
    }

    let backend = build_backend(&config, browser);
    if !backend.is_available() {
        return Err(AddrexError::PrinterUnavailable);
    }

    let controller = Controller::new(config);
    let (tx, rx) = mpsc::channel();
    let handle = controller.start_printing(files, backend, Arc::new(tx))?;
    output::watch_for_stop(controller.clone(), progress);
    output::drain(rx, progress);

    let summary = handle
        .join()
        .map_err(|_| AddrexError::Aborted("print worker panicked".into()))?;
    if summary.succeeded == 0 && summary.failed > 0 {
        eprintln!("No files were printed successfully.");
    }
    Ok(())
}

fn build_backend(config: &AppConfig, program: Option<String>) -> Box<dyn PrintBackend> {
    let print = &config.print;
    match print.mode {
        PrintMode::Headless => {
            let candidates = match program {
                Some(browser) => vec![browser],
                None => print.browser_candidates.clone(),
            };
            Box::new(HeadlessBrowser::discover(
                &candidates,
                print.timeout(),
                print.settle(),
            ))
        }
        PrintMode::Interactive => {
            let viewer = program
                .or_else(|| print.viewer.clone())
                .and_then(|v| find_program(&[v]));
            Box::new(InteractiveViewer::new(
                viewer,
                Box::new(XdotoolKeys),
                print.settle(),
                print.key_delay(),
            ))
        }
    }
}
