//! Metrics collection and reporting for refarm operations.
//!
//! This module provides structured metric types organized by command:
//! - [`split`] - Marker detection and read splitting metrics
//! - [`removed`] - Metrics for recovering the sequence removed by splitting
//! - [`writer`] - Metrics file I/O utilities
//!
//! # Traits
//!
//! - [`Metric`] - Core trait for serializable metrics
//! - [`ProcessingMetrics`] - Common interface for input/output metrics

pub mod removed;
pub mod split;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use removed::RemovedMetrics;
pub use split::SplitMetrics;
pub use writer::{write_metrics, write_metrics_auto};

/// A metric type that can be serialized to TSV files.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type.
    ///
    /// Used in error messages and logging when writing metrics files.
    fn metric_name() -> &'static str;
}

/// Common interface for metrics that track processing pipeline counts.
pub trait ProcessingMetrics {
    /// Total number of input items processed.
    fn total_input(&self) -> u64;

    /// Total number of output items produced.
    fn total_output(&self) -> u64;

    /// Total number of input items filtered out or rejected.
    fn total_filtered(&self) -> u64;

    /// Fraction of input items that were not filtered, as a percentage.
    fn efficiency(&self) -> f64 {
        if self.total_input() == 0 {
            0.0
        } else {
            #[expect(clippy::cast_precision_loss, reason = "read counts never exceed 2^53")]
            let result = (self.total_input() - self.total_filtered()) as f64
                / self.total_input() as f64
                * 100.0;
            result
        }
    }
}
