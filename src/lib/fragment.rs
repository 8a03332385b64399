//! Cutting a subread around an internal marker match.
//!
//! Given the span `[ref_begin, ref_end]` of a marker match inside a read, the read is cut
//! into up to two fragments:
//!
//! - the **left** fragment `read[0..ref_begin)`, emitted when `ref_begin > 0`
//! - the **right** fragment `read[ref_end + 1..)`, emitted when
//!   `origin_start + ref_end + 1 < origin_end`
//!
//! Each fragment is a new unmapped record named `run/zmw/start_end` with its own
//! polymerase-read coordinates. Read-level tags are copied, per-base tracks are sliced
//! with the sequence, `qs`/`qe` are rewritten to the new range and the `cx` context flags
//! record on which side of the fragment the marker was found.
//!
//! # Example
//!
//! ```
//! use refarm_lib::align::Alignment;
//! use refarm_lib::fragment::split_record;
//! use refarm_lib::sam::SubreadBuilder;
//!
//! let record = SubreadBuilder::new("runA/42/1000_1100").sequence(&"A".repeat(100)).build();
//! let alignment = Alignment { ref_begin: 10, ref_end: 14, score: 60, second_best_score: 0 };
//!
//! let mut fragments = Vec::new();
//! let decision = split_record(&record, &alignment, &mut fragments).unwrap();
//! assert!(decision.emit_left && decision.emit_right);
//! assert_eq!(fragments[0].name().unwrap(), "runA/42/1000_1010");
//! assert_eq!(fragments[1].name().unwrap(), "runA/42/1015_1100");
//! ```

use std::ops::Range;

use bstr::BString;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{Data, QualityScores, Sequence};

use crate::align::Alignment;
use crate::errors::{RefarmError, Result};
use crate::read_name::ReadName;
use crate::sam::{buf_value_as_i64, slice_buf_value};

/// Context-flag bit: an adapter was found before (5' of) the fragment.
pub const ADAPTER_BEFORE: u8 = 0x1;

/// Context-flag bit: an adapter was found after (3' of) the fragment.
pub const ADAPTER_AFTER: u8 = 0x2;

/// Query start (`qs`): first polymerase-read coordinate of the record.
pub const QUERY_START: Tag = Tag::new(b'q', b's');

/// Query end (`qe`): polymerase-read coordinate one past the last base.
pub const QUERY_END: Tag = Tag::new(b'q', b'e');

/// Local context flags (`cx`).
pub const CONTEXT_FLAGS: Tag = Tag::new(b'c', b'x');

/// Read-level tags copied unchanged onto each fragment.
pub const COPIED_TAGS: [Tag; 5] = [
    Tag::READ_GROUP,
    Tag::new(b'n', b'p'),
    Tag::new(b'r', b'q'),
    Tag::new(b's', b'n'),
    Tag::new(b'z', b'm'),
];

/// Per-base tracks sliced together with the sequence.
pub const PER_BASE_TAGS: [Tag; 7] = [
    Tag::new(b'd', b'q'),
    Tag::new(b'd', b't'),
    Tag::new(b'i', b'q'),
    Tag::new(b'm', b'q'),
    Tag::new(b's', b'q'),
    Tag::new(b'i', b'p'),
    Tag::new(b'p', b'w'),
];

/// Which side of the marker a fragment comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The part of the read before the marker.
    Left,
    /// The part of the read after the marker.
    Right,
}

impl Side {
    /// The context-flag bit recording where the marker sits relative to this fragment.
    #[must_use]
    pub fn adapter_flag(self) -> u8 {
        match self {
            Side::Left => ADAPTER_AFTER,
            Side::Right => ADAPTER_BEFORE,
        }
    }
}

/// Which fragments to emit for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitDecision {
    /// Emit the part of the read before the marker.
    pub emit_left: bool,
    /// Emit the part of the read after the marker.
    pub emit_right: bool,
}

impl SplitDecision {
    /// Decides which fragments a marker match produces.
    ///
    /// # Errors
    ///
    /// Returns [`RefarmError::CoordinateOverflow`] if the end of the match overflows the
    /// polymerase-read coordinates.
    pub fn new(name: &ReadName, alignment: &Alignment) -> Result<Self> {
        Ok(Self {
            emit_left: alignment.ref_begin > 0,
            emit_right: right_start(name, alignment)? < name.origin_end(),
        })
    }

    /// Number of fragments this decision produces.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        usize::from(self.emit_left) + usize::from(self.emit_right)
    }
}

/// `origin_start + offset`, or an error if that leaves the `u64` range.
fn origin_offset(name: &ReadName, offset: usize) -> Result<u64> {
    u64::try_from(offset)
        .ok()
        .and_then(|offset| name.origin_start().checked_add(offset))
        .ok_or_else(|| RefarmError::CoordinateOverflow {
            name: name.to_string(),
            value: name.origin_start(),
        })
}

/// Polymerase-read coordinate of the first base after the marker.
fn right_start(name: &ReadName, alignment: &Alignment) -> Result<u64> {
    origin_offset(name, alignment.ref_end.saturating_add(1))
}

/// Sequence range and polymerase-read range covered by a fragment.
fn fragment_bounds(
    name: &ReadName,
    alignment: &Alignment,
    side: Side,
) -> Result<(Range<usize>, Range<u64>)> {
    Ok(match side {
        Side::Left => (
            0..alignment.ref_begin,
            name.origin_start()..origin_offset(name, alignment.ref_begin)?,
        ),
        Side::Right => (
            alignment.ref_end.saturating_add(1)..usize::MAX,
            right_start(name, alignment)?..name.origin_end(),
        ),
    })
}

/// Clamps `range` to a track of length `len`.
fn clamp(range: &Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

/// Converts a polymerase-read coordinate for a 32-bit tag.
fn coordinate_value(name: &ReadName, value: u64) -> Result<Value> {
    i32::try_from(value)
        .map(Value::Int32)
        .map_err(|_| RefarmError::CoordinateOverflow { name: name.to_string(), value })
}

/// Builds one fragment of `record`.
///
/// The fragment keeps the record's flags (marked unmapped) and only the tags listed in
/// [`COPIED_TAGS`] and [`PER_BASE_TAGS`]; every other tag is dropped.
///
/// # Errors
///
/// Returns [`RefarmError::CoordinateOverflow`] if a new coordinate overflows or does not
/// fit in `qs`/`qe`.
pub fn build_fragment(
    record: &RecordBuf,
    name: &ReadName,
    alignment: &Alignment,
    side: Side,
) -> Result<RecordBuf> {
    let (seq_range, origin_range) = fragment_bounds(name, alignment, side)?;
    let fragment_name = name.with_range(origin_range.start, origin_range.end);

    let bases = record.sequence().as_ref();
    let sequence = Sequence::from(bases[clamp(&seq_range, bases.len())].to_vec());

    let quals = record.quality_scores().as_ref();
    let quality_scores = QualityScores::from(quals[clamp(&seq_range, quals.len())].to_vec());

    let source = record.data();
    let mut data = Data::default();

    for tag in COPIED_TAGS {
        if let Some(value) = source.get(&tag) {
            data.insert(tag, value.clone());
        }
    }

    for tag in PER_BASE_TAGS {
        if let Some(sliced) =
            source.get(&tag).and_then(|v| slice_buf_value(v, seq_range.start, seq_range.end))
        {
            data.insert(tag, sliced);
        }
    }

    data.insert(QUERY_START, coordinate_value(&fragment_name, origin_range.start)?);
    data.insert(QUERY_END, coordinate_value(&fragment_name, origin_range.end)?);

    let context = source
        .get(&CONTEXT_FLAGS)
        .and_then(buf_value_as_i64)
        .and_then(|cx| u8::try_from(cx).ok())
        .unwrap_or(0);
    data.insert(CONTEXT_FLAGS, Value::UInt8(context | side.adapter_flag()));

    Ok(RecordBuf::builder()
        .set_name(BString::from(fragment_name.to_string()))
        .set_flags(record.flags() | Flags::UNMAPPED)
        .set_sequence(sequence)
        .set_quality_scores(quality_scores)
        .set_data(data)
        .build())
}

/// Splits `record` around a marker match, appending 0, 1 or 2 fragments to `out`.
///
/// The left fragment, if any, is appended before the right one.
///
/// # Errors
///
/// Returns [`RefarmError::InvalidReadName`] if the record name is missing or not of the
/// form `run/zmw/start_end`, or [`RefarmError::CoordinateOverflow`] from
/// [`build_fragment`].
pub fn split_record(
    record: &RecordBuf,
    alignment: &Alignment,
    out: &mut Vec<RecordBuf>,
) -> Result<SplitDecision> {
    let name = match record.name() {
        Some(raw) => ReadName::from_bytes(raw)?,
        None => {
            return Err(RefarmError::InvalidReadName {
                name: String::new(),
                reason: "record has no name".to_string(),
            });
        }
    };

    let decision = SplitDecision::new(&name, alignment)?;
    if decision.emit_left {
        out.push(build_fragment(record, &name, alignment, Side::Left)?);
    }
    if decision.emit_right {
        out.push(build_fragment(record, &name, alignment, Side::Right)?);
    }
    Ok(decision)
}
