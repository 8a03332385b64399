//! Metrics for the `split` command.

use serde::{Deserialize, Serialize};

use super::{Metric, ProcessingMetrics};

/// Counts of how reads fared during marker detection and splitting.
///
/// Each worker keeps its own instance; the instances are merged once all workers finish.
/// Every examined read falls in exactly one of the four outcome buckets
/// (`reads_low_score`, `reads_low_margin`, `reads_not_split`, `reads_split`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMetrics {
    /// Input records examined
    pub reads_examined: u64,

    /// Reads skipped because the best marker match scored below the minimum
    pub reads_low_score: u64,

    /// Reads skipped because the best match was too close to the second best
    pub reads_low_margin: u64,

    /// Confident matches that produced no fragment (marker covers the whole read)
    pub reads_not_split: u64,

    /// Confident matches that produced at least one fragment
    pub reads_split: u64,

    /// Fragments taken from before the marker
    pub left_fragments: u64,

    /// Fragments taken from after the marker
    pub right_fragments: u64,

    /// Total bases in all written fragments
    pub bases_written: u64,
}

impl SplitMetrics {
    /// Adds the counts from `other` into `self`.
    pub fn merge(&mut self, other: &SplitMetrics) {
        self.reads_examined += other.reads_examined;
        self.reads_low_score += other.reads_low_score;
        self.reads_low_margin += other.reads_low_margin;
        self.reads_not_split += other.reads_not_split;
        self.reads_split += other.reads_split;
        self.left_fragments += other.left_fragments;
        self.right_fragments += other.right_fragments;
        self.bases_written += other.bases_written;
    }

    /// Total fragments written.
    #[must_use]
    pub fn fragments_written(&self) -> u64 {
        self.left_fragments + self.right_fragments
    }
}

impl Metric for SplitMetrics {
    fn metric_name() -> &'static str {
        "split"
    }
}

impl ProcessingMetrics for SplitMetrics {
    fn total_input(&self) -> u64 {
        self.reads_examined
    }

    fn total_output(&self) -> u64 {
        self.fragments_written()
    }

    fn total_filtered(&self) -> u64 {
        self.reads_low_score + self.reads_low_margin
    }
}

impl std::iter::Sum for SplitMetrics {
    fn sum<I: Iterator<Item = SplitMetrics>>(iter: I) -> Self {
        iter.fold(SplitMetrics::default(), |mut acc, m| {
            acc.merge(&m);
            acc
        })
    }
}
