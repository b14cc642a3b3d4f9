use addrex_core::config::AppConfig;
use addrex_core::error::AddrexError;
use addrex_core::spreadsheet::SpreadsheetSink;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::output::{self, Progress};

pub fn run(
    file: PathBuf,
    yes: bool,
    config: &AppConfig,
    progress: Progress,
) -> Result<(), AddrexError> {
    if !yes {
        if !std::io::stdin().is_terminal() {
            return Err(AddrexError::Aborted(
                "refusing to clear without --yes when stdin is not a terminal".into(),
            ));
        }
        let question = format!(
            "Clear all rows from {}? This cannot be undone.",
            file.display()
        );
        if !output::confirm(&question)? {
            eprintln!("Nothing cleared.");
            return Ok(());
        }
    }

    let sink = SpreadsheetSink::new(&file).with_header(config.header_label.clone());
    if !sink.clear(&progress) {
        return Err(AddrexError::WorkbookWrite(format!(
            "could not clear {}",
            file.display()
        )));
    }
    Ok(())
}
