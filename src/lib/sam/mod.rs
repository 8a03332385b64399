//! SAM/BAM record utilities.
//!
//! This module provides utilities for working with PacBio subread records, including:
//! - Slicing per-base tag values (string and numeric array tracks) to a sub-range
//! - Test utilities for building subread records
//!
//! # Per-base tracks
//!
//! PacBio subread BAMs carry several tracks that are parallel to the read sequence:
//! kinetics (`ip`, `pw`) stored as numeric arrays and QV tracks (`dq`, `dt`, `iq`, `mq`,
//! `sq`) stored as strings. When a read is cut, each track must be cut at the same
//! positions as the sequence.

pub mod builder;

pub use builder::SubreadBuilder;

use bstr::BString;
use noodles::sam::alignment::record_buf::data::field::Value as BufValue;

/// Clamps `[start, end)` to a track of length `len`.
fn clamp_range(len: usize, start: usize, end: usize) -> std::ops::Range<usize> {
    let end = end.min(len);
    start.min(end)..end
}

/// Slices a per-base tag value to the half-open range `[start, end)`.
///
/// Strings and numeric arrays are sliced element-wise. The range is clamped to the
/// length of the value, so a track shorter than the read yields a shorter (possibly
/// empty) slice rather than an error.
///
/// # Arguments
///
/// * `value` - The tag value to slice
/// * `start` - First element to keep
/// * `end` - One past the last element to keep
///
/// # Returns
///
/// The sliced value, or `None` if the value is a scalar and therefore not a per-base track
///
/// # Examples
///
/// ```rust
/// use noodles::sam::alignment::record_buf::data::field::Value as BufValue;
/// use noodles::sam::alignment::record_buf::data::field::value::Array;
/// use refarm_lib::sam::slice_buf_value;
///
/// let ipd = BufValue::Array(Array::UInt8(vec![1, 2, 3, 4, 5]));
/// assert_eq!(slice_buf_value(&ipd, 1, 3), Some(BufValue::Array(Array::UInt8(vec![2, 3]))));
///
/// let qv = BufValue::from("ABCDE");
/// assert_eq!(slice_buf_value(&qv, 3, 10), Some(BufValue::from("DE")));
///
/// assert_eq!(slice_buf_value(&BufValue::from(7i32), 0, 1), None);
/// ```
#[must_use]
pub fn slice_buf_value(value: &BufValue, start: usize, end: usize) -> Option<BufValue> {
    use noodles::sam::alignment::record_buf::data::field::value::Array;

    fn slice<T: Clone>(values: &[T], start: usize, end: usize) -> Vec<T> {
        values[clamp_range(values.len(), start, end)].to_vec()
    }

    let sliced = match value {
        BufValue::String(s) => BufValue::String(BString::from(slice(s, start, end))),
        BufValue::Hex(h) => BufValue::Hex(BString::from(slice(h, start, end))),
        BufValue::Array(arr) => BufValue::Array(match arr {
            Array::Int8(values) => Array::Int8(slice(values, start, end)),
            Array::UInt8(values) => Array::UInt8(slice(values, start, end)),
            Array::Int16(values) => Array::Int16(slice(values, start, end)),
            Array::UInt16(values) => Array::UInt16(slice(values, start, end)),
            Array::Int32(values) => Array::Int32(slice(values, start, end)),
            Array::UInt32(values) => Array::UInt32(slice(values, start, end)),
            Array::Float(values) => Array::Float(slice(values, start, end)),
        }),
        _ => return None,
    };

    Some(sliced)
}

/// Reads an integer tag value of any width as an `i64`.
///
/// Returns `None` for non-integer values.
#[must_use]
pub fn buf_value_as_i64(value: &BufValue) -> Option<i64> {
    match value {
        BufValue::Int8(n) => Some(i64::from(*n)),
        BufValue::UInt8(n) => Some(i64::from(*n)),
        BufValue::Int16(n) => Some(i64::from(*n)),
        BufValue::UInt16(n) => Some(i64::from(*n)),
        BufValue::Int32(n) => Some(i64::from(*n)),
        BufValue::UInt32(n) => Some(i64::from(*n)),
        _ => None,
    }
}
