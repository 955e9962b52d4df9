//! Cooperative cancellation for the live loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable stop flag. The loop polls it between cycles, so a call already
/// in flight always completes before the stop is noticed.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    stopped: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
