//! Batch scanning: enumerate PDFs, extract text, collect fragments.

use crate::error::AddrexError;
use crate::events::{Event, EventSink};
use crate::extraction::markers::try_extract_fragment;
use crate::extraction::{document_text, PdfExtractor};
use crate::run::CancellationToken;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Filename to extracted fragment, in scan order.
pub type ExtractionResult = IndexMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Also descend into subfolders.
    pub recursive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub entries: ExtractionResult,
    /// Number of PDF files found.
    pub total: usize,
    /// Files read successfully but without a marker span.
    pub skipped: usize,
    /// Files that could not be read or decoded.
    pub failed: usize,
    /// True when a stop request ended the batch early.
    pub stopped: bool,
}

/// A PDF found during enumeration, with the key it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub path: PathBuf,
    pub name: String,
}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// List PDF files in `folder`, sorted by name. Subfolders are visited
/// depth-first after the folder's own files when `recursive` is set.
pub fn find_pdfs(folder: &Path, recursive: bool) -> Result<Vec<PdfFile>, AddrexError> {
    if !folder.is_dir() {
        return Err(AddrexError::FolderNotFound(folder.to_path_buf()));
    }
    let mut out = Vec::new();
    collect_pdfs(folder, folder, recursive, &mut out)?;
    Ok(out)
}

fn collect_pdfs(
    root: &Path,
    dir: &Path,
    recursive: bool,
    out: &mut Vec<PdfFile>,
) -> Result<(), AddrexError> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            subdirs.push(path);
        } else if is_pdf(&path) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    subdirs.sort();

    for path in files {
        let name = display_key(root, &path);
        out.push(PdfFile { path, name });
    }

    if recursive {
        for sub in subdirs {
            match collect_pdfs(root, &sub, recursive, out) {
                Ok(()) => {}
                Err(e) => log::warn!("skipping unreadable folder {}: {e}", sub.display()),
            }
        }
    }
    Ok(())
}

/// Top-level files are keyed by file name; nested files by their
/// `/`-joined path relative to the scanned folder.
fn display_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan every PDF in `folder` and extract fragments.
pub fn scan_folder(
    folder: &Path,
    options: &ScanOptions,
    extractor: &dyn PdfExtractor,
    events: &dyn EventSink,
    cancel: &CancellationToken,
) -> Result<ScanReport, AddrexError> {
    let files = find_pdfs(folder, options.recursive)?;
    if files.is_empty() {
        events.emit(Event::NoFilesFound {
            folder: folder.to_path_buf(),
        });
        return Ok(ScanReport::default());
    }
    Ok(scan_files(&files, extractor, events, cancel))
}

/// Run the per-file pipeline over an explicit list of files.
///
/// Individual failures are reported and counted; they never abort the batch.
pub fn scan_files(
    files: &[PdfFile],
    extractor: &dyn PdfExtractor,
    events: &dyn EventSink,
    cancel: &CancellationToken,
) -> ScanReport {
    let total = files.len();
    let mut report = ScanReport {
        total,
        ..Default::default()
    };
    events.emit(Event::BatchStarted { total });
    log::debug!("scanning {total} files with {}", extractor.backend_name());

    for (i, file) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            report.stopped = true;
            events.emit(Event::Stopped { processed: i });
            return report;
        }

        events.emit(Event::FileStarted {
            index: i + 1,
            total,
            name: file.name.clone(),
        });

        let text = match read_document(&file.path, extractor) {
            Ok(text) => text,
            Err(e) => {
                report.failed += 1;
                events.emit(Event::FileFailed {
                    name: file.name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match try_extract_fragment(&text) {
            Ok(fragment) => {
                events.emit(Event::FileSucceeded {
                    name: file.name.clone(),
                });
                report.entries.insert(file.name.clone(), fragment);
            }
            Err(miss) => {
                report.skipped += 1;
                events.emit(Event::MarkersNotFound {
                    name: file.name.clone(),
                    reason: miss.to_string(),
                });
            }
        }
    }

    events.emit(Event::BatchComplete {
        extracted: report.entries.len(),
        skipped: report.skipped,
        failed: report.failed,
    });
    report
}

/// Read a PDF from disk and return all page text concatenated.
pub fn read_document(path: &Path, extractor: &dyn PdfExtractor) -> Result<String, AddrexError> {
    let bytes = std::fs::read(path)?;
    let pages = extractor.extract_pages(&bytes)?;
    Ok(document_text(&pages))
}

/// Build `PdfFile` entries for paths chosen individually rather than by folder.
pub fn files_from_paths(paths: &[PathBuf]) -> Vec<PdfFile> {
    paths
        .iter()
        .map(|p| PdfFile {
            path: p.clone(),
            name: p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
        })
        .collect()
}
