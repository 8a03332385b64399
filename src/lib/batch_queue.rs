//! Batched access to a single sequential record source shared by many workers.
//!
//! A BAM reader can only be driven by one caller at a time. [`BoundedBatchQueue`] owns
//! the reader behind a mutex and hands out whole batches: each call to
//! [`BoundedBatchQueue::drain_next`] fills the internal buffer from the source and swaps
//! it out in the same critical section, so callers never see a partially filled batch
//! and never touch the reader concurrently. Once a batch is returned the caller owns it
//! and processes it without holding any lock.
//!
//! # Example
//!
//! ```
//! use refarm_lib::batch_queue::{BoundedBatchQueue, RecordSource};
//!
//! struct Counter(u32, u32);
//!
//! impl RecordSource for Counter {
//!     type Record = u32;
//!     type Context = ();
//!
//!     fn next_record(&mut self, _ctx: &()) -> std::io::Result<Option<u32>> {
//!         if self.0 == self.1 { return Ok(None); }
//!         self.0 += 1;
//!         Ok(Some(self.0))
//!     }
//! }
//!
//! let queue = BoundedBatchQueue::new(Counter(0, 5), 2);
//! assert_eq!(queue.drain_next(&()).unwrap(), vec![1, 2]);
//! assert_eq!(queue.drain_next(&()).unwrap(), vec![3, 4]);
//! assert_eq!(queue.drain_next(&()).unwrap(), vec![5]);
//! assert!(queue.drain_next(&()).unwrap().is_empty());
//! ```

use std::io::{self, BufRead};

use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use parking_lot::Mutex;

/// A sequential source of records that supports only one caller at a time.
pub trait RecordSource {
    /// The record type produced.
    type Record;
    /// Shared state needed to decode a record (e.g. the SAM header).
    type Context: ?Sized;

    /// Reads the next record, returning `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be read or decoded.
    fn next_record(&mut self, ctx: &Self::Context) -> io::Result<Option<Self::Record>>;
}

impl<R: BufRead> RecordSource for noodles::bam::io::Reader<R> {
    type Record = RecordBuf;
    type Context = Header;

    fn next_record(&mut self, header: &Header) -> io::Result<Option<RecordBuf>> {
        let mut record = RecordBuf::default();
        match self.read_record_buf(header, &mut record)? {
            0 => Ok(None),
            _ => Ok(Some(record)),
        }
    }
}

/// State guarded by the queue's lock.
struct QueueState<S: RecordSource> {
    source: S,
    buffer: Vec<S::Record>,
    exhausted: bool,
}

/// Hands out fixed-size batches from a [`RecordSource`] to concurrent callers.
pub struct BoundedBatchQueue<S: RecordSource> {
    state: Mutex<QueueState<S>>,
    capacity: usize,
}

impl<S: RecordSource> BoundedBatchQueue<S> {
    /// Creates a queue that drains up to `capacity` records per batch.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(source: S, capacity: usize) -> Self {
        assert!(capacity > 0, "batch capacity must be at least 1");
        Self {
            state: Mutex::new(QueueState {
                source,
                buffer: Vec::with_capacity(capacity),
                exhausted: false,
            }),
            capacity,
        }
    }

    /// The maximum number of records returned by a single drain.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fills a batch from the source and hands it to the caller.
    ///
    /// Reads stop early when the source is exhausted. An empty batch means the source
    /// has been fully consumed; every later call also returns an empty batch without
    /// touching the source again.
    ///
    /// # Errors
    ///
    /// Returns the source's error if a record cannot be read. Records read before the
    /// error stay buffered for the next call.
    pub fn drain_next(&self, ctx: &S::Context) -> io::Result<Vec<S::Record>> {
        let mut state = self.state.lock();

        while !state.exhausted && state.buffer.len() < self.capacity {
            match state.source.next_record(ctx)? {
                Some(record) => state.buffer.push(record),
                None => state.exhausted = true,
            }
        }

        Ok(std::mem::replace(&mut state.buffer, Vec::with_capacity(self.capacity)))
    }

    /// Returns true once the source has reported exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state.lock().exhausted
    }

    /// Consumes the queue and returns the underlying source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.state.into_inner().source
    }
}
