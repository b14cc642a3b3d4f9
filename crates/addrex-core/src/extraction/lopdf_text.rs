use crate::error::AddrexError;
use crate::extraction::PdfExtractor;
use lopdf::Document;

/// Pure-Rust extraction backend built on `lopdf`.
///
/// Used when poppler is not installed. Text order follows the content
/// stream, which is usually close enough for letters generated by a mail merge.
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        LopdfExtractor
    }
}

impl Default for LopdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, AddrexError> {
        let doc = Document::load_mem(pdf_bytes)?;

        // get_pages is a BTreeMap keyed by page number, so iteration is in page order.
        let mut pages = Vec::new();
        for (page_number, _page_id) in doc.get_pages() {
            let text = doc.extract_text(&[page_number]).map_err(|e| {
                AddrexError::Extraction(format!("page {page_number}: {e}"))
            })?;
            pages.push(text);
        }
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_an_error() {
        let result = LopdfExtractor::new().extract_pages(b"not a pdf at all");
        assert!(result.is_err());
    }
}
