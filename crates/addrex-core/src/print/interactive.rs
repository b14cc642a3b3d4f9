use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use crate::error::AddrexError;
use crate::print::{wait_with_timeout, PrintBackend, PrintOutcome};

/// Synthesizes keyboard input into the focused window.
pub trait KeySender: Send {
    /// Send one key chord, e.g. `ctrl+p` or `Return`.
    fn send(&mut self, chord: &str) -> Result<(), AddrexError>;
}

/// Key chords sent to the reader for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPlan {
    pub print: String,
    pub confirm: String,
    pub close: String,
}

impl Default for KeyPlan {
    fn default() -> Self {
        KeyPlan {
            print: "ctrl+p".into(),
            confirm: "Return".into(),
            close: "ctrl+w".into(),
        }
    }
}

/// `KeySender` backed by the `xdotool` command (X11).
#[derive(Debug, Default)]
pub struct XdotoolKeys;

impl KeySender for XdotoolKeys {
    fn send(&mut self, chord: &str) -> Result<(), AddrexError> {
        let status = Command::new("xdotool")
            .arg("key")
            .arg(chord)
            .status()
            .map_err(|e| AddrexError::Launch {
                program: "xdotool".into(),
                reason: e.to_string(),
            })?;
        if !status.success() {
            return Err(AddrexError::Launch {
                program: "xdotool".into(),
                reason: format!("'key {chord}' exited with {status}"),
            });
        }
        Ok(())
    }
}

/// Opens each PDF in a visible reader and drives its print dialog from the keyboard.
pub struct InteractiveViewer {
    viewer: Option<PathBuf>,
    keys: Box<dyn KeySender>,
    plan: KeyPlan,
    settle: Duration,
    key_delay: Duration,
    child: Option<Child>,
}

impl InteractiveViewer {
    pub fn new(
        viewer: Option<PathBuf>,
        keys: Box<dyn KeySender>,
        settle: Duration,
        key_delay: Duration,
    ) -> Self {
        InteractiveViewer {
            viewer,
            keys,
            plan: KeyPlan::default(),
            settle,
            key_delay,
            child: None,
        }
    }

    pub fn with_plan(mut self, plan: KeyPlan) -> Self {
        self.plan = plan;
        self
    }

    fn drive(&mut self) -> Result<(), AddrexError> {
        std::thread::sleep(self.settle);
        self.keys.send(&self.plan.print)?;
        std::thread::sleep(self.key_delay);
        self.keys.send(&self.plan.confirm)?;
        std::thread::sleep(self.key_delay);
        self.keys.send(&self.plan.close)
    }
}

impl PrintBackend for InteractiveViewer {
    fn name(&self) -> &str {
        "interactive viewer"
    }

    fn is_available(&self) -> bool {
        self.viewer.is_some()
    }

    fn print_one(&mut self, path: &Path) -> Result<PrintOutcome, AddrexError> {
        let viewer = self.viewer.clone().ok_or(AddrexError::PrinterUnavailable)?;
        let child = Command::new(&viewer)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AddrexError::Launch {
                program: viewer.display().to_string(),
                reason: e.to_string(),
            })?;
        self.child = Some(child);

        let driven = self.drive();

        // Readers that survive the close shortcut are torn down here so the
        // next file starts from a clean window.
        if let Some(mut child) = self.child.take() {
            let waited = wait_with_timeout(&mut child, self.key_delay);
            reap(&mut child, waited);
        }

        driven.map(|()| PrintOutcome::Sent)
    }

    fn abort(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Kill `child` unless the wait saw it exit.
fn reap(child: &mut Child, waited: std::io::Result<Option<ExitStatus>>) {
    match waited {
        Ok(Some(_)) => return,
        Ok(None) => {}
        Err(e) => log::warn!("lost track of the reader process: {e}"),
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl KeySender for Recorder {
        fn send(&mut self, chord: &str) -> Result<(), AddrexError> {
            self.0.lock().unwrap().push(chord.to_string());
            Ok(())
        }
    }

    #[test]
    fn without_viewer_nothing_is_sent() {
        let keys = Recorder::default();
        let mut backend =
            InteractiveViewer::new(None, Box::new(keys.clone()), Duration::ZERO, Duration::ZERO);
        assert!(!backend.is_available());
        assert!(backend.print_one(Path::new("a.pdf")).is_err());
        assert!(keys.0.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn sends_print_confirm_close() {
        let keys = Recorder::default();
        // `true` stands in for a reader: it starts and exits immediately.
        let viewer = crate::print::find_program(&["true".to_string()]);
        let Some(viewer) = viewer else { return };
        let mut backend = InteractiveViewer::new(
            Some(viewer),
            Box::new(keys.clone()),
            Duration::ZERO,
            Duration::from_millis(10),
        );
        let outcome = backend.print_one(Path::new("letter.pdf")).unwrap();
        assert_eq!(outcome, PrintOutcome::Sent);
        assert_eq!(*keys.0.lock().unwrap(), vec!["ctrl+p", "Return", "ctrl+w"]);
    }

    #[cfg(unix)]
    #[test]
    fn failed_wait_still_kills_reader() {
        let Some(sleep) = crate::print::find_program(&["sleep".to_string()]) else {
            return;
        };
        let mut child = Command::new(sleep).arg("30").spawn().unwrap();
        let waited = Err(std::io::Error::new(std::io::ErrorKind::Other, "wait failed"));
        reap(&mut child, waited);
        assert!(child.try_wait().unwrap().is_some());
    }
}
