//! Process-shutdown sweep of temporary registry entries.
//!
//! The registry itself is an explicit owned object; only the shutdown
//! sweep needs process-wide reach. That reach is provided by a roster of
//! weak sweep handles rather than a global registry: every
//! [`FileRegistry`](super::FileRegistry) registers a [`ShutdownSweep`] on
//! creation, and the host's termination path calls
//! [`run_shutdown_sweeps`] exactly once, synchronously, before the process
//! is allowed to exit. Asynchronous cleanup at process-exit time is
//! unreliable and deliberately not offered.

use std::sync::{Mutex, OnceLock, PoisonError, Weak};

use tracing::{debug, info};

use super::RegistryState;

static SWEEP_ROSTER: OnceLock<Mutex<Vec<ShutdownSweep>>> = OnceLock::new();

fn roster() -> &'static Mutex<Vec<ShutdownSweep>> {
    SWEEP_ROSTER.get_or_init(|| Mutex::new(Vec::new()))
}

/// A weak handle able to sweep one registry's temporary entries.
///
/// Holding a handle does not keep the registry alive; sweeping a dropped
/// registry is a no-op.
#[derive(Debug, Clone)]
pub struct ShutdownSweep {
    state: Weak<Mutex<RegistryState>>,
}

impl ShutdownSweep {
    pub(super) fn new(state: Weak<Mutex<RegistryState>>) -> Self {
        ShutdownSweep { state }
    }

    /// Remove every currently-temporary entry of the target registry.
    ///
    /// Idempotent: the temporary set is drained, so a second call finds
    /// nothing to do. Already-removed keys are skipped without raising.
    /// Returns the number of files removed.
    pub fn sweep(&self) -> usize {
        let Some(state) = self.state.upgrade() else {
            debug!("registry already dropped, nothing to sweep");
            return 0;
        };
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep()
    }
}

/// Add a sweep handle to the process-wide roster.
pub fn register_sweeper(sweep: ShutdownSweep) {
    roster()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(sweep);
}

/// Sweep every registered registry, synchronously.
///
/// Wire this to the host's termination path (signal handler, end of
/// `main`). The roster is drained, so invoking it from several shutdown
/// signals sweeps each registry once. Returns the total number of files
/// removed.
pub fn run_shutdown_sweeps() -> usize {
    let handles: Vec<ShutdownSweep> = {
        let mut guard = roster().lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    };
    let mut removed = 0;
    for handle in &handles {
        removed += handle.sweep();
    }
    if !handles.is_empty() {
        info!(registries = handles.len(), files_removed = removed, "shutdown sweep complete");
    }
    removed
}
