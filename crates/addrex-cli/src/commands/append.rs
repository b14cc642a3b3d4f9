use addrex_core::config::AppConfig;
use addrex_core::error::AddrexError;
use addrex_core::spreadsheet::SpreadsheetSink;
use std::path::PathBuf;

use crate::output::Progress;

pub fn run(
    file: PathBuf,
    mut addresses: Vec<String>,
    from_file: Option<PathBuf>,
    config: &AppConfig,
    progress: Progress,
) -> Result<(), AddrexError> {
    if let Some(path) = from_file {
        let text = std::fs::read_to_string(&path)?;
        addresses.extend(split_blocks(&text));
    }
    if addresses.iter().all(|a| a.trim().is_empty()) {
        eprintln!("Nothing to append.");
        return Ok(());
    }

    let sink = SpreadsheetSink::new(&file).with_header(config.header_label.clone());
    if !sink.append_unsourced(&addresses, &progress) {
        return Err(AddrexError::WorkbookWrite(format!(
            "could not append to {}",
            file.display()
        )));
    }
    Ok(())
}

/// Addresses separated by one or more blank lines.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_split_on_blank_lines() {
        let text = "1 Oak Lane\nLeeds\n\n\n2 Elm Road  \nYork\n   \n3 Ash Close\n";
        assert_eq!(
            split_blocks(text),
            vec!["1 Oak Lane\nLeeds", "2 Elm Road\nYork", "3 Ash Close"]
        );
    }

    #[test]
    fn empty_text_has_no_blocks() {
        assert!(split_blocks("\n \n").is_empty());
    }
}
