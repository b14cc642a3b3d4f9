#![allow(dead_code)]

use addrex_core::error::AddrexError;
use addrex_core::extraction::PdfExtractor;
use addrex_core::run::CancellationToken;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Treats file bytes as UTF-8 page text (pages split on form feed) instead of
/// invoking a real PDF backend. Files starting with `CORRUPT` fail to decode.
#[derive(Default)]
pub struct MockExtractor {
    calls: AtomicUsize,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` once `n` files have been extracted.
    pub fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        MockExtractor {
            calls: AtomicUsize::new(0),
            cancel_after: Mutex::new(Some((n, token))),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, AddrexError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = self.cancel_after.lock().unwrap().as_ref() {
            if n >= *after {
                token.cancel();
            }
        }
        if pdf_bytes.starts_with(b"CORRUPT") {
            return Err(AddrexError::Extraction("invalid cross-reference table".into()));
        }
        let text = String::from_utf8(pdf_bytes.to_vec())
            .map_err(|e| AddrexError::Extraction(e.to_string()))?;
        Ok(text.split('\x0c').map(str::to_string).collect())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Letter text whose extracted fragment is `street\ntown`.
pub fn letter(street: &str, town: &str) -> String {
    format!(
        "Customer Services\nuk_team_gbmailgps@lilly.com\nRef 1234\n\n{street}\n{town}\n\nDear Customer,\nBody text."
    )
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}
