pub mod config;
pub mod error;
pub mod events;
pub mod extraction;
pub mod print;
pub mod run;
pub mod scan;
pub mod spreadsheet;

use error::AddrexError;
use extraction::markers::extract_fragment;
use extraction::{document_text, PdfExtractor};

pub use run::controller::{run_extraction, run_extraction_files, Controller, ExtractionOutcome};

/// Main API entry point for a single document: extract the address fragment.
///
/// `Ok(None)` means the document was readable but has no marker span.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<Option<String>, AddrexError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(extract_fragment(&document_text(&pages)))
}
