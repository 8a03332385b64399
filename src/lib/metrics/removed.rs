//! Metrics for the `removed` command.

use serde::{Deserialize, Serialize};

use super::{Metric, ProcessingMetrics};

/// Counts describing how much sequence splitting removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedMetrics {
    /// Distinct ZMWs among the original reads
    pub zmws: u64,

    /// Original (unsplit) reads loaded
    pub original_reads: u64,

    /// Split reads subtracted from a known ZMW
    pub refarmed_reads: u64,

    /// Split reads whose ZMW had no original read
    pub unknown_zmw_reads: u64,

    /// Removed segments written
    pub segments_written: u64,

    /// Total bases in removed segments
    pub bases_written: u64,
}

impl Metric for RemovedMetrics {
    fn metric_name() -> &'static str {
        "removed"
    }
}

impl ProcessingMetrics for RemovedMetrics {
    fn total_input(&self) -> u64 {
        self.refarmed_reads + self.unknown_zmw_reads
    }

    fn total_output(&self) -> u64 {
        self.segments_written
    }

    fn total_filtered(&self) -> u64 {
        self.unknown_zmw_reads
    }
}
