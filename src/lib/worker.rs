//! The split worker pool.
//!
//! Every worker runs the same loop against shared state:
//!
//! 1. drain a batch from the [`BoundedBatchQueue`]
//! 2. align the marker against each read and skip low-confidence matches
//! 3. cut confident reads into fragments ([`split_record`])
//! 4. hand the batch's fragments to the [`OutputSerializer`] in one call
//!
//! until the queue returns an empty batch. The queue and the serializer hold the only
//! locks; the aligner, the fragment buffer and the metrics are private to each worker.

use anyhow::{Context, Result};
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use serde::{Deserialize, Serialize};

use crate::align::{Alignment, LocalAligner, Scoring, SmithWaterman};
use crate::batch_queue::{BoundedBatchQueue, RecordSource};
use crate::fragment::split_record;
use crate::metrics::SplitMetrics;
use crate::output::{OutputSerializer, RecordSink};
use crate::progress::ProgressTracker;

/// Default minimum alignment score for a marker match.
pub const DEFAULT_MIN_SCORE: i32 = 50;

/// Default minimum difference between the best and second-best marker scores.
pub const DEFAULT_MIN_MARGIN: i32 = 10;

/// Alignment scoring and confidence thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitParams {
    /// Scoring scheme for the marker alignment.
    pub scoring: Scoring,
    /// Matches scoring below this are skipped.
    pub min_score: i32,
    /// Matches whose score exceeds the second best by less than this are skipped.
    pub min_margin: i32,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            scoring: Scoring::default(),
            min_score: DEFAULT_MIN_SCORE,
            min_margin: DEFAULT_MIN_MARGIN,
        }
    }
}

/// Why a read was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No match, or a match scoring below `min_score`.
    LowScore,
    /// A match too close to the second-best score to be trusted.
    LowMargin,
}

impl SplitParams {
    /// Accepts an alignment only if it is confident enough to split on.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] reason for absent, low-scoring or ambiguous matches.
    pub fn screen(&self, alignment: Option<Alignment>) -> Result<Alignment, Rejection> {
        let Some(alignment) = alignment else {
            return Err(Rejection::LowScore);
        };
        if alignment.score < self.min_score {
            return Err(Rejection::LowScore);
        }
        if alignment.margin() < self.min_margin {
            return Err(Rejection::LowMargin);
        }
        Ok(alignment)
    }
}

/// State shared by every worker in the pool.
pub struct SplitShared<'a, S: RecordSource, W: RecordSink> {
    /// The single input, drained in batches.
    pub queue: &'a BoundedBatchQueue<S>,
    /// The single output.
    pub output: &'a OutputSerializer<W>,
    /// Header used to decode input and encode output records.
    pub header: &'a Header,
    /// Marker (adaptor) sequence to find in each read.
    pub marker: &'a [u8],
    /// Scoring and thresholds.
    pub params: &'a SplitParams,
    /// Optional progress logger.
    pub progress: Option<&'a ProgressTracker>,
}

impl<S: RecordSource, W: RecordSink> Clone for SplitShared<'_, S, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: RecordSource, W: RecordSink> Copy for SplitShared<'_, S, W> {}

/// One worker: owns an aligner and a fragment buffer, and counts what it did.
pub struct SplitWorker<'a, S: RecordSource, W: RecordSink, A = SmithWaterman> {
    shared: SplitShared<'a, S, W>,
    aligner: A,
    fragments: Vec<RecordBuf>,
    metrics: SplitMetrics,
}

impl<'a, S, W, A> SplitWorker<'a, S, W, A>
where
    S: RecordSource<Record = RecordBuf, Context = Header>,
    W: RecordSink<Record = RecordBuf, Context = Header>,
    A: LocalAligner,
{
    /// Creates a worker over the shared state.
    #[must_use]
    pub fn new(shared: SplitShared<'a, S, W>, aligner: A) -> Self {
        Self { shared, aligner, fragments: Vec::new(), metrics: SplitMetrics::default() }
    }

    /// Aligns, screens and splits one record, buffering its fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if the record's name cannot be parsed or a fragment coordinate
    /// overflows its tag.
    pub fn process_record(&mut self, record: &RecordBuf) -> Result<()> {
        self.metrics.reads_examined += 1;

        let found = self.aligner.align(self.shared.marker, record.sequence().as_ref());
        let alignment = match self.shared.params.screen(found) {
            Ok(alignment) => alignment,
            Err(Rejection::LowScore) => {
                self.metrics.reads_low_score += 1;
                return Ok(());
            }
            Err(Rejection::LowMargin) => {
                self.metrics.reads_low_margin += 1;
                return Ok(());
            }
        };

        let before = self.fragments.len();
        let decision = split_record(record, &alignment, &mut self.fragments)?;

        if decision.fragment_count() == 0 {
            self.metrics.reads_not_split += 1;
        } else {
            self.metrics.reads_split += 1;
        }
        self.metrics.left_fragments += u64::from(decision.emit_left);
        self.metrics.right_fragments += u64::from(decision.emit_right);
        self.metrics.bases_written +=
            self.fragments[before..].iter().map(|f| f.sequence().len() as u64).sum::<u64>();
        Ok(())
    }

    /// Runs until the queue is exhausted and returns this worker's metrics.
    ///
    /// # Errors
    ///
    /// Returns the first read, split or write error this worker hits; the worker stops
    /// at that point.
    pub fn run(mut self) -> Result<SplitMetrics> {
        let header = self.shared.header;
        loop {
            let batch =
                self.shared.queue.drain_next(header).context("Failed to read input records")?;
            if batch.is_empty() {
                break;
            }

            for record in &batch {
                self.process_record(record)?;
            }

            self.shared
                .output
                .write_batch(header, &self.fragments)
                .context("Failed to write output records")?;
            self.fragments.clear();

            if let Some(progress) = self.shared.progress {
                progress.log_if_needed(batch.len() as u64);
            }
        }
        Ok(self.metrics)
    }
}

/// Runs `threads` workers to completion and merges their metrics.
///
/// Each worker gets its own aligner from `make_aligner`. If any worker fails, the others
/// still run to exhaustion (or their own failure) and the error of the lowest-numbered
/// failing worker is returned.
///
/// # Errors
///
/// Returns a worker's error if any worker failed.
///
/// # Panics
///
/// Re-raises a panic from any worker thread.
pub fn run_workers<S, W, A, F>(
    shared: SplitShared<'_, S, W>,
    threads: usize,
    make_aligner: F,
) -> Result<SplitMetrics>
where
    S: RecordSource<Record = RecordBuf, Context = Header> + Send,
    W: RecordSink<Record = RecordBuf, Context = Header> + Send,
    A: LocalAligner,
    F: Fn() -> A + Sync,
{
    let make_aligner = &make_aligner;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads.max(1))
            .map(|_| scope.spawn(move || SplitWorker::new(shared, make_aligner()).run()))
            .collect();

        let mut total = SplitMetrics::default();
        let mut first_error = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(metrics)) => total.merge(&metrics),
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(total),
        }
    })
}
