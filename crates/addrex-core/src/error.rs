use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AddrexError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("failed to open workbook {}: {reason}", path.display())]
    WorkbookRead { path: PathBuf, reason: String },

    #[error("failed to write workbook: {0}")]
    WorkbookWrite(String),

    #[error("failed to load config from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("no usable browser or viewer found for printing")]
    PrinterUnavailable,

    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },

    #[error("another operation is already running")]
    Busy,

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for AddrexError {
    fn from(e: zip::result::ZipError) -> Self {
        AddrexError::WorkbookWrite(e.to_string())
    }
}
