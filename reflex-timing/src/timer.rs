use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Millisecond clock driving session timers.
pub trait Timer: Clone + Send + Sync {
    /// Milliseconds since the timer was created.
    fn now(&self) -> u64;

    fn elapsed(&self, since: u64) -> u64 {
        self.now().saturating_sub(since)
    }
}

/// Wall-clock timer backed by a monotonic `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicTimer {
    pub start: Instant,
}

impl Timer for MonotonicTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl MonotonicTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-cranked timer. Clones share the same clock, so a test can keep one
/// handle and advance the clock seen by the session it drives.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ms: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
