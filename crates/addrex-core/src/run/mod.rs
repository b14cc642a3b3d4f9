pub mod controller;

use crate::error::AddrexError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag shared between the host and a worker.
///
/// Workers poll it between files; nothing is interrupted mid-file.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Processing and stop-requested flags for the one active run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    processing: Arc<AtomicBool>,
    stop: CancellationToken,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the single run slot. Fails with `Busy` while another run holds it.
    pub fn try_begin(&self) -> Result<RunGuard, AddrexError> {
        self.processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AddrexError::Busy)?;
        self.stop.reset();
        Ok(RunGuard {
            state: self.clone(),
        })
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.stop.clone()
    }
}

/// Held by the worker for the duration of a run. Dropping it resets both flags.
#[derive(Debug)]
pub struct RunGuard {
    state: RunState,
}

impl RunGuard {
    pub fn token(&self) -> CancellationToken {
        self.state.token()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.stop.reset();
        self.state.processing.store(false, Ordering::SeqCst);
    }
}
