pub mod lopdf_text;
pub mod markers;
pub mod pdftotext;

use crate::error::AddrexError;

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one string per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, AddrexError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Join per-page text into one document string. Page boundaries are not kept.
pub fn document_text(pages: &[String]) -> String {
    pages.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_join_without_separator() {
        let pages = vec!["uk_team_gbmailgps@lilly.com\nA\n".to_string(), "B\nDear".to_string()];
        assert_eq!(document_text(&pages), "uk_team_gbmailgps@lilly.com\nA\nB\nDear");
        assert_eq!(document_text(&[]), "");
    }
}
