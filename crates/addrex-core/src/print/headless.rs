use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use quick_xml::escape::escape;

use crate::error::AddrexError;
use crate::print::{find_program, wait_with_timeout, PrintBackend, PrintOutcome};

/// Flags that keep the browser invisible and send `window.print()` straight
/// to the default printer.
const HEADLESS_FLAGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--disable-web-security",
    "--kiosk-printing",
    "--no-sandbox",
];

/// Edge and Chrome install locations, then names resolved through `PATH`.
pub fn default_browser_candidates() -> Vec<String> {
    [
        r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "msedge",
        "microsoft-edge",
        "google-chrome",
        "chromium",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Prints through a headless Chromium-family browser and a throwaway HTML
/// page that embeds the PDF and calls `window.print()`.
pub struct HeadlessBrowser {
    browser: Option<PathBuf>,
    timeout: Duration,
    settle: Duration,
}

impl HeadlessBrowser {
    pub fn new(browser: Option<PathBuf>, timeout: Duration, settle: Duration) -> Self {
        HeadlessBrowser {
            browser,
            timeout,
            settle,
        }
    }

    /// Use the first browser found among `candidates`.
    pub fn discover(candidates: &[String], timeout: Duration, settle: Duration) -> Self {
        let browser = find_program(candidates);
        match &browser {
            Some(path) => log::info!("headless printing via {}", path.display()),
            None => log::warn!("no browser found among {} candidates", candidates.len()),
        }
        Self::new(browser, timeout, settle)
    }

    pub fn browser(&self) -> Option<&Path> {
        self.browser.as_deref()
    }
}

impl PrintBackend for HeadlessBrowser {
    fn name(&self) -> &str {
        "headless browser"
    }

    fn is_available(&self) -> bool {
        self.browser.is_some()
    }

    fn print_one(&mut self, path: &Path) -> Result<PrintOutcome, AddrexError> {
        let browser = self.browser.as_ref().ok_or(AddrexError::PrinterUnavailable)?;
        let pdf = std::fs::canonicalize(path)?;

        // Removed when dropped at the end of this call.
        let mut wrapper = tempfile::Builder::new()
            .prefix("addrex-print-")
            .suffix(".html")
            .tempfile()?;
        wrapper.write_all(auto_print_html(&pdf).as_bytes())?;
        wrapper.flush()?;

        let mut child = Command::new(browser)
            .args(HEADLESS_FLAGS)
            .arg(file_url(wrapper.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AddrexError::Launch {
                program: browser.display().to_string(),
                reason: e.to_string(),
            })?;

        match wait_with_timeout(&mut child, self.timeout)? {
            Some(status) => {
                log::debug!("browser exited with {status}");
                std::thread::sleep(self.settle);
                Ok(PrintOutcome::Sent)
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Ok(PrintOutcome::TimedOut)
            }
        }
    }
}

/// `file:` URL for a local path, with the characters browsers choke on encoded.
///
/// Windows verbatim paths (`\\?\C:\...`, as returned by `canonicalize`) lose
/// their prefix; verbatim and plain UNC paths keep the server as URL host.
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let plain = match raw.strip_prefix(r"\\?\UNC\") {
        Some(unc) => format!(r"\\{unc}"),
        None => raw.strip_prefix(r"\\?\").unwrap_or(raw.as_ref()).to_string(),
    };
    let slashed = plain.replace('\\', "/");
    match slashed.strip_prefix("//") {
        Some(unc) => format!("file://{}", encode_url_path(unc)),
        None => format!("file:///{}", encode_url_path(slashed.trim_start_matches('/'))),
    }
}

fn encode_url_path(path: &str) -> String {
    path.replace('%', "%25")
        .replace(' ', "%20")
        .replace('#', "%23")
}

fn auto_print_html(pdf: &Path) -> String {
    let src = file_url(pdf);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Auto Print PDF</title>
<style>
body {{ margin: 0; padding: 0; }}
embed {{ width: 100%; height: 100vh; }}
</style>
</head>
<body>
<embed src="{}" type="application/pdf">
<script>
window.onload = function() {{
    setTimeout(function() {{
        window.print();
        setTimeout(function() {{ window.close(); }}, 3000);
    }}, 2000);
}};
</script>
</body>
</html>
"#,
        escape(src.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_urls() {
        assert_eq!(file_url(Path::new("/tmp/a b.pdf")), "file:///tmp/a%20b.pdf");
        assert_eq!(
            file_url(Path::new(r"C:\Letters\x#1.pdf")),
            "file:///C:/Letters/x%231.pdf"
        );
    }

    #[test]
    fn verbatim_windows_paths() {
        assert_eq!(
            file_url(Path::new(r"\\?\C:\Letters\a.pdf")),
            "file:///C:/Letters/a.pdf"
        );
        assert_eq!(
            file_url(Path::new(r"\\?\UNC\fileserver\post\a b.pdf")),
            "file://fileserver/post/a%20b.pdf"
        );
        assert_eq!(
            file_url(Path::new(r"\\fileserver\post\a.pdf")),
            "file://fileserver/post/a.pdf"
        );
    }

    #[test]
    fn wrapper_embeds_pdf() {
        let html = auto_print_html(Path::new("/tmp/letter.pdf"));
        assert!(html.contains(r#"<embed src="file:///tmp/letter.pdf""#));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn missing_browser_is_unavailable() {
        let mut backend = HeadlessBrowser::new(None, Duration::ZERO, Duration::ZERO);
        assert!(!backend.is_available());
        let err = backend.print_one(Path::new("/tmp/a.pdf")).unwrap_err();
        assert!(matches!(err, AddrexError::PrinterUnavailable));
    }

    #[test]
    fn default_candidates_include_path_lookups() {
        let candidates = default_browser_candidates();
        assert!(candidates.iter().any(|c| c == "msedge"));
        assert!(candidates[0].ends_with("msedge.exe"));
    }
}
