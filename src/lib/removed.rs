//! Recovering the sequence that splitting removed.
//!
//! Splitting drops the marker (and anything outside the emitted fragments) from each
//! polymerase read. Comparing the original subreads with the split output, ZMW by ZMW,
//! recovers exactly what was cut away: every polymerase-read interval of the original
//! reads minus every interval that survived in the split output.
//!
//! ```
//! use refarm_lib::removed::RemovedTracker;
//! use refarm_lib::read_name::ReadName;
//!
//! let mut tracker = RemovedTracker::default();
//! tracker.add_original(ReadName::parse("runA/7/100_120").unwrap(), b"AAAAACCCCCGGGGGTTTTT");
//! tracker.subtract(&ReadName::parse("runA/7/100_105").unwrap());
//! tracker.subtract(&ReadName::parse("runA/7/110_120").unwrap());
//!
//! let removed: Vec<_> = tracker.into_removed().collect();
//! assert_eq!(removed.len(), 1);
//! assert_eq!(removed[0].0.to_string(), "runA/7/105_110");
//! assert_eq!(removed[0].1, b"CCCCC");
//! ```

use std::collections::BTreeMap;

use crate::read_name::ReadName;

/// A half-open interval `[start, end)` of polymerase-read coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    /// First coordinate (inclusive).
    pub start: u64,
    /// Last coordinate (exclusive).
    pub end: u64,
}

impl Interval {
    /// Creates an interval, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        if end < start { Self { start: end, end: start } } else { Self { start, end } }
    }

    /// The interval covered by a read name.
    #[must_use]
    pub fn of(name: &ReadName) -> Self {
        Self::new(name.origin_start(), name.origin_end())
    }

    /// True if the intervals share at least one coordinate.
    #[must_use]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.end.min(other.end) > self.start.max(other.start)
    }

    /// The parts of `self` not covered by `other`, in order.
    ///
    /// A non-overlapping `other` leaves `self` whole; otherwise the pieces before and after
    /// `other` are returned, if non-empty.
    pub fn subtract(&self, other: &Interval) -> impl Iterator<Item = Interval> + use<> {
        let pieces = if self.overlaps(other) {
            [
                (self.start < other.start).then(|| Interval::new(self.start, other.start)),
                (self.end > other.end).then(|| Interval::new(other.end, self.end)),
            ]
        } else {
            [Some(*self), None]
        };
        pieces.into_iter().flatten()
    }
}

/// The remaining pieces of one ZMW's polymerase read, kept sorted by interval.
#[derive(Debug, Clone)]
struct ZmwSegments {
    /// A name from this ZMW; segment names are derived from it.
    name: ReadName,
    segments: Vec<(Interval, Vec<u8>)>,
}

impl ZmwSegments {
    fn new(name: &ReadName) -> Self {
        Self { name: name.clone(), segments: Vec::new() }
    }

    fn insert(&mut self, interval: Interval, bases: Vec<u8>) {
        let at = self.segments.partition_point(|(existing, _)| *existing <= interval);
        self.segments.insert(at, (interval, bases));
    }

    fn subtract(&mut self, removed: &Interval) {
        if !self.segments.iter().any(|(interval, _)| interval.overlaps(removed)) {
            return;
        }

        let segments = std::mem::take(&mut self.segments);
        for (interval, bases) in segments {
            if !interval.overlaps(removed) {
                self.segments.push((interval, bases));
                continue;
            }
            for piece in interval.subtract(removed) {
                let len = bases.len();
                let offset = |coord: u64| {
                    usize::try_from(coord - interval.start).map_or(len, |o| o.min(len))
                };
                let slice = bases[offset(piece.start)..offset(piece.end)].to_vec();
                self.segments.push((piece, slice));
            }
        }
    }
}

/// Accumulates original reads per ZMW and subtracts the intervals kept after splitting.
#[derive(Debug, Default)]
pub struct RemovedTracker {
    zmws: BTreeMap<(String, String), ZmwSegments>,
    original_reads: u64,
    subtracted_reads: u64,
    unknown_reads: u64,
}

impl RemovedTracker {
    /// Records an original read and its bases.
    pub fn add_original(&mut self, name: ReadName, bases: &[u8]) {
        self.original_reads += 1;
        let key = (name.run_name().to_string(), name.zmw().to_string());
        self.zmws
            .entry(key)
            .or_insert_with(|| ZmwSegments::new(&name))
            .insert(Interval::of(&name), bases.to_vec());
    }

    /// Removes the interval of a kept (split) read from its ZMW.
    ///
    /// Returns `false` if no original read was seen for the ZMW; the read is then ignored.
    pub fn subtract(&mut self, name: &ReadName) -> bool {
        let key = (name.run_name().to_string(), name.zmw().to_string());
        match self.zmws.get_mut(&key) {
            Some(segments) => {
                segments.subtract(&Interval::of(name));
                self.subtracted_reads += 1;
                true
            }
            None => {
                self.unknown_reads += 1;
                false
            }
        }
    }

    /// Number of ZMWs seen among the original reads.
    #[must_use]
    pub fn zmw_count(&self) -> usize {
        self.zmws.len()
    }

    /// Number of original reads added.
    #[must_use]
    pub fn original_reads(&self) -> u64 {
        self.original_reads
    }

    /// Number of kept reads subtracted from a known ZMW.
    #[must_use]
    pub fn subtracted_reads(&self) -> u64 {
        self.subtracted_reads
    }

    /// Number of kept reads whose ZMW had no original read.
    #[must_use]
    pub fn unknown_reads(&self) -> u64 {
        self.unknown_reads
    }

    /// The remaining pieces, named `run/zmw/start_end`, ordered by run, ZMW and position.
    pub fn into_removed(self) -> impl Iterator<Item = (ReadName, Vec<u8>)> {
        self.zmws.into_values().flat_map(|ZmwSegments { name, segments }| {
            segments.into_iter().map(move |(interval, bases)| {
                (name.with_range(interval.start, interval.end), bases)
            })
        })
    }
}
