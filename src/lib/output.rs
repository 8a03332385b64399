//! Serialized access to a single sequential output sink.
//!
//! Workers produce fragments in parallel, but a BAM writer must be driven by one caller
//! at a time. [`OutputSerializer`] owns the sink behind a mutex so that every call writes
//! its records contiguously. Records from different calls may land in any order.

use std::io::{self, Write};

use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use parking_lot::Mutex;

/// A sequential record sink that supports only one caller at a time.
pub trait RecordSink {
    /// The record type accepted.
    type Record;
    /// Shared state needed to encode a record (e.g. the SAM header).
    type Context: ?Sized;

    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    fn write_record(&mut self, ctx: &Self::Context, record: &Self::Record) -> io::Result<()>;
}

impl<W: Write> RecordSink for noodles::bam::io::Writer<W> {
    type Record = RecordBuf;
    type Context = Header;

    fn write_record(&mut self, header: &Header, record: &RecordBuf) -> io::Result<()> {
        self.write_alignment_record(header, record)
    }
}

/// Totally orders writes from many workers onto one [`RecordSink`].
pub struct OutputSerializer<S> {
    sink: Mutex<S>,
}

impl<S: RecordSink> OutputSerializer<S> {
    /// Wraps `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink: Mutex::new(sink) }
    }

    /// Writes a single record.
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn write(&self, ctx: &S::Context, record: &S::Record) -> io::Result<()> {
        self.sink.lock().write_record(ctx, record)
    }

    /// Writes all `records` without interleaving writes from other callers.
    ///
    /// # Errors
    ///
    /// Returns the first error from the sink; later records in the batch are not written.
    pub fn write_batch(&self, ctx: &S::Context, records: &[S::Record]) -> io::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut sink = self.sink.lock();
        for record in records {
            sink.write_record(ctx, record)?;
        }
        Ok(())
    }

    /// Consumes the serializer and returns the sink so it can be finished.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.sink.into_inner()
    }
}
