//! Progress reporting for grid construction.
//!
//! Construction calls [`ProgressSink::tick`] once per completed cell. Sinks may
//! be called from several worker threads at once. Progress is advisory:
//! building without a sink is always allowed and gives the same result.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sink that consumes progress ticks.
pub trait ProgressSink: Send + Sync + Debug {
    /// Called before the first tick with the total number of ticks to expect.
    fn start(&self, _total: usize) {}

    /// One unit of work completed.
    fn tick(&self);
}

/// Counts ticks.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicUsize,
    count: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks received so far
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Total announced by the last `start`
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed fraction in [0, 1], or 0 before `start`.
    pub fn fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.count() as f64 / total as f64).min(1.0),
        }
    }
}

impl ProgressSink for ProgressCounter {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }

    #[inline]
    fn tick(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Logs progress through `tracing` every `interval` ticks.
#[derive(Debug)]
pub struct LogProgress {
    interval: usize,
    counter: ProgressCounter,
}

impl LogProgress {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            counter: ProgressCounter::new(),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl ProgressSink for LogProgress {
    fn start(&self, total: usize) {
        self.counter.start(total);
        tracing::info!("Building {} cells", total);
    }

    fn tick(&self) {
        let n = self.counter.count.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.counter.total();
        if n % self.interval == 0 || n == total {
            tracing::info!(
                "Built {}/{} cells ({:.1}%)",
                n,
                total,
                100.0 * self.counter.fraction()
            );
        }
    }
}
