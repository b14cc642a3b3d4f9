use addrex_core::events::{Event, EventSink, LogSink};
use addrex_core::Controller;
use std::io::{BufRead, IsTerminal, Write};
use std::sync::mpsc::Receiver;

/// Where progress events go: straight to stderr, or under `--quiet` to the
/// log facade, where only warnings and errors pass the default filter.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub quiet: bool,
}

impl EventSink for Progress {
    fn emit(&self, event: Event) {
        if self.quiet {
            LogSink.emit(event);
        } else {
            eprintln!("{event}");
        }
    }
}

/// Render events until the worker drops its sender.
pub fn drain(events: Receiver<Event>, progress: Progress) {
    for event in events {
        progress.emit(event);
    }
}

/// Let the user type `stop` (or `q`) to cancel the running worker.
///
/// Only watches an interactive terminal; piped stdin is left alone.
pub fn watch_for_stop(controller: Controller, progress: Progress) {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    eprintln!("Type 'stop' and press Enter to cancel.");
    let spawned = std::thread::Builder::new()
        .name("addrex-stdin".into())
        .spawn(move || {
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if matches!(line.trim(), "stop" | "q") {
                    controller.stop(&progress);
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::warn!("cannot watch stdin for stop requests: {e}");
    }
}

/// Ask a yes/no question on the terminal. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> std::io::Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
