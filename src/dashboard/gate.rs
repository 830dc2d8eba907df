//! Serializes dashboard runs and numbers them.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// At most one run holds the gate at a time.
///
/// Each run gets a strictly increasing generation number so a caller holding
/// an older result can tell it has been superseded.
#[derive(Debug, Default)]
pub struct RequestGate {
    lock: Mutex<()>,
    latest: AtomicU64,
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the gate, passing it the run's generation.
    pub fn run<T>(&self, f: impl FnOnce(u64) -> T) -> T {
        let _guard = self.lock.lock();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        f(generation)
    }

    /// Generation of the most recently started run, 0 before any run.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Whether a result from `generation` is still the newest.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest()
    }
}
