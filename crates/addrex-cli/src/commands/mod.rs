pub mod append;
pub mod clear;
pub mod config;
pub mod extract;
pub mod print;

use addrex_core::config::{load_config, AppConfig};
use addrex_core::error::AddrexError;
use addrex_core::scan::{find_pdfs, is_pdf};
use std::path::{Path, PathBuf};

/// Settings from `--config`, or the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<AppConfig, AddrexError> {
    match path {
        Some(path) => {
            let config = load_config(path)?;
            log::info!("loaded settings from {}", path.display());
            Ok(config)
        }
        None => Ok(AppConfig::default()),
    }
}

/// PDFs named on the command line. Folders expand to the PDFs inside them;
/// files are kept when they have a `.pdf` extension.
pub fn collect_pdfs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, AddrexError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_pdfs(input, recursive)?.into_iter().map(|f| f.path));
        } else if input.is_file() {
            if is_pdf(input) {
                files.push(input.clone());
            } else {
                log::warn!("skipping {}: not a PDF", input.display());
            }
        } else {
            return Err(AddrexError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", input.display()),
            )));
        }
    }
    Ok(files)
}
