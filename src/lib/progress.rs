//! Progress logging shared by all split workers.
//!
//! Workers report how many records they finished after each batch. The tracker keeps one
//! atomic total and logs every time that total crosses a multiple of the interval, so the
//! log shows steady milestones no matter which worker reached them.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::format_count;

/// Thread-safe counter that logs a line at regular milestones.
///
/// # Example
/// ```
/// use refarm_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Processed reads").with_interval(100);
/// std::thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| {
///             for _ in 0..5 {
///                 tracker.log_if_needed(10);
///             }
///         });
///     }
/// });
/// assert_eq!(tracker.count(), 200);
/// tracker.log_final();
/// ```
pub struct ProgressTracker {
    /// Progress is logged whenever the count crosses a multiple of this.
    interval: u64,
    /// Message prefix for log output.
    message: String,
    count: AtomicU64,
}

impl ProgressTracker {
    /// Creates a tracker that logs every 100,000 items.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 100_000, message: message.into(), count: AtomicU64::new(0) }
    }

    /// Sets the logging interval. An interval of zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds `additional` to the count, logging each milestone crossed.
    ///
    /// Returns `true` if the count now sits exactly on a milestone.
    pub fn log_if_needed(&self, additional: u64) -> bool {
        if additional == 0 {
            let count = self.count.load(Ordering::Relaxed);
            return count > 0 && count.is_multiple_of(self.interval);
        }

        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let new_count = prev + additional;

        for milestone in (prev / self.interval + 1)..=(new_count / self.interval) {
            info!("{} {}", self.message, format_count(milestone * self.interval));
        }

        new_count.is_multiple_of(self.interval)
    }

    /// Logs the final count unless it was just logged as a milestone.
    pub fn log_final(&self) {
        if !self.log_if_needed(0) {
            let count = self.count.load(Ordering::Relaxed);
            if count > 0 {
                info!("{} {} (complete)", self.message, format_count(count));
            }
        }
    }

    /// The current count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
