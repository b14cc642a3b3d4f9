//! Batch printing through an external browser or reader process.

pub mod headless;
pub mod interactive;

use crate::error::AddrexError;
use crate::events::{Event, EventSink};
use crate::run::CancellationToken;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of handing one file to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Sent,
    /// The external process did not finish in time. The job may still print.
    TimedOut,
}

/// A way of getting one PDF onto the printer.
pub trait PrintBackend: Send {
    fn name(&self) -> &str;

    /// Whether the external application could be found.
    fn is_available(&self) -> bool;

    fn print_one(&mut self, path: &Path) -> Result<PrintOutcome, AddrexError>;

    /// Best-effort kill of any process still running for the current file.
    fn abort(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Pause between consecutive files.
    pub between_files: Duration,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            between_files: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub stopped: bool,
}

/// Print `files` one at a time in sorted order.
///
/// A timeout counts as success. Errors are counted and the batch continues.
pub fn print_all(
    files: &[PathBuf],
    backend: &mut dyn PrintBackend,
    options: &PrintOptions,
    events: &dyn EventSink,
    cancel: &CancellationToken,
) -> PrintSummary {
    let mut summary = PrintSummary::default();

    if !backend.is_available() {
        events.emit(Event::PrinterUnavailable {
            backend: backend.name().to_string(),
        });
        summary.failed = files.len();
        return summary;
    }

    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort();
    let total = sorted.len();

    for (i, path) in sorted.into_iter().enumerate() {
        if cancel.is_cancelled() {
            backend.abort();
            summary.stopped = true;
            events.emit(Event::Stopped { processed: i });
            return summary;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        events.emit(Event::PrintStarted {
            index: i + 1,
            total,
            name: name.clone(),
        });

        match backend.print_one(path) {
            Ok(PrintOutcome::Sent) => {
                summary.succeeded += 1;
                events.emit(Event::PrintSent { name });
            }
            Ok(PrintOutcome::TimedOut) => {
                summary.succeeded += 1;
                events.emit(Event::PrintTimedOut { name });
            }
            Err(e) => {
                summary.failed += 1;
                events.emit(Event::PrintFailed {
                    name,
                    error: e.to_string(),
                });
            }
        }

        if i + 1 < total && !options.between_files.is_zero() {
            std::thread::sleep(options.between_files);
        }
    }

    events.emit(Event::PrintComplete {
        succeeded: summary.succeeded,
        failed: summary.failed,
    });
    summary
}

/// First candidate that exists as a path, or resolves through `PATH` when it
/// is a bare program name.
pub fn find_program(candidates: &[String]) -> Option<PathBuf> {
    candidates.iter().find_map(|c| {
        let path = Path::new(c);
        if path.components().count() > 1 || path.is_absolute() {
            path.is_file().then(|| path.to_path_buf())
        } else {
            search_path(c)
        }
    })
}

fn search_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let exact = dir.join(program);
        if exact.is_file() {
            return Some(exact);
        }
        let exe = dir.join(format!("{program}.exe"));
        exe.is_file().then_some(exe)
    })
}

/// Wait for `child` up to `timeout`. Returns `None` if it is still running.
pub(crate) fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if std::time::Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    struct Scripted {
        available: bool,
        fail_on: Vec<&'static str>,
        timeout_on: Vec<&'static str>,
        printed: Vec<String>,
        /// Cancel this token once this many files were handed over.
        cancel_after: Option<(usize, CancellationToken)>,
        aborted: bool,
    }

    impl Scripted {
        fn new() -> Self {
            Scripted {
                available: true,
                fail_on: vec![],
                timeout_on: vec![],
                printed: vec![],
                cancel_after: None,
                aborted: false,
            }
        }
    }

    impl PrintBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn print_one(&mut self, path: &Path) -> Result<PrintOutcome, AddrexError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.printed.push(name.clone());
            if let Some((n, token)) = &self.cancel_after {
                if self.printed.len() == *n {
                    token.cancel();
                }
            }
            if self.fail_on.contains(&name.as_str()) {
                return Err(AddrexError::Launch {
                    program: "viewer".into(),
                    reason: "crashed".into(),
                });
            }
            if self.timeout_on.contains(&name.as_str()) {
                return Ok(PrintOutcome::TimedOut);
            }
            Ok(PrintOutcome::Sent)
        }

        fn abort(&mut self) {
            self.aborted = true;
        }
    }

    fn no_delay() -> PrintOptions {
        PrintOptions {
            between_files: Duration::ZERO,
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/letters").join(n)).collect()
    }

    #[test]
    fn prints_in_sorted_order() {
        let mut backend = Scripted::new();
        let log = EventLog::new();
        let summary = print_all(
            &paths(&["c.pdf", "a.pdf", "b.pdf"]),
            &mut backend,
            &no_delay(),
            &log,
            &CancellationToken::new(),
        );
        assert_eq!(backend.printed, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(
            summary,
            PrintSummary {
                succeeded: 3,
                failed: 0,
                stopped: false
            }
        );
    }

    #[test]
    fn unavailable_backend_fails_everything() {
        let mut backend = Scripted::new();
        backend.available = false;
        let log = EventLog::new();
        let summary = print_all(
            &paths(&["a.pdf", "b.pdf"]),
            &mut backend,
            &no_delay(),
            &log,
            &CancellationToken::new(),
        );
        assert_eq!((summary.succeeded, summary.failed), (0, 2));
        assert!(backend.printed.is_empty());
        assert!(matches!(log.events()[0], Event::PrinterUnavailable { .. }));
    }

    #[test]
    fn failure_does_not_abort_and_timeout_counts_as_success() {
        let mut backend = Scripted::new();
        backend.fail_on = vec!["b.pdf"];
        backend.timeout_on = vec!["c.pdf"];
        let log = EventLog::new();
        let summary = print_all(
            &paths(&["a.pdf", "b.pdf", "c.pdf"]),
            &mut backend,
            &no_delay(),
            &log,
            &CancellationToken::new(),
        );
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert!(log
            .events()
            .contains(&Event::PrintTimedOut { name: "c.pdf".into() }));
    }

    #[test]
    fn stop_before_start_prints_nothing() {
        let mut backend = Scripted::new();
        let log = EventLog::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = print_all(&paths(&["a.pdf"]), &mut backend, &no_delay(), &log, &cancel);
        assert!(summary.stopped);
        assert_eq!((summary.succeeded, summary.failed), (0, 0));
        assert_eq!(log.events(), vec![Event::Stopped { processed: 0 }]);
    }

    #[test]
    fn stop_midway_keeps_counts_so_far() {
        let cancel = CancellationToken::new();
        let mut backend = Scripted::new();
        backend.cancel_after = Some((2, cancel.clone()));
        let log = EventLog::new();
        let summary = print_all(
            &paths(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]),
            &mut backend,
            &no_delay(),
            &log,
            &cancel,
        );
        assert_eq!(
            summary,
            PrintSummary {
                succeeded: 2,
                failed: 0,
                stopped: true
            }
        );
        assert!(backend.aborted);
        assert_eq!(backend.printed, vec!["a.pdf", "b.pdf"]);
        let events = log.events();
        assert_eq!(events.last(), Some(&Event::Stopped { processed: 2 }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::PrintComplete { .. })));
    }

    #[test]
    fn find_program_skips_missing_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("viewer");
        std::fs::write(&present, b"").unwrap();
        let candidates = vec![
            "/no/such/browser".to_string(),
            present.to_string_lossy().into_owned(),
        ];
        assert_eq!(find_program(&candidates), Some(present));
        assert_eq!(find_program(&["/no/such/browser".to_string()]), None);
    }
}
