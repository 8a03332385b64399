//! Assertion helpers for checking fragment records.

#![allow(dead_code)]

use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::data::field::value::Array;

/// The record name as a string.
#[must_use]
pub fn name_of(record: &RecordBuf) -> String {
    record.name().map(ToString::to_string).unwrap_or_default()
}

/// The names of `records`, in order.
#[must_use]
pub fn names_of(records: &[RecordBuf]) -> Vec<String> {
    records.iter().map(name_of).collect()
}

fn tag(raw: &str) -> Tag {
    let bytes = raw.as_bytes();
    Tag::new(bytes[0], bytes[1])
}

/// An integer tag value of any width.
///
/// # Panics
///
/// Panics if the tag is missing or not an integer.
#[must_use]
pub fn int_tag(record: &RecordBuf, raw: &str) -> i64 {
    match record.data().get(&tag(raw)) {
        Some(Value::Int8(n)) => i64::from(*n),
        Some(Value::UInt8(n)) => i64::from(*n),
        Some(Value::Int16(n)) => i64::from(*n),
        Some(Value::UInt16(n)) => i64::from(*n),
        Some(Value::Int32(n)) => i64::from(*n),
        Some(Value::UInt32(n)) => i64::from(*n),
        other => panic!("{raw} on {} is not an integer: {other:?}", name_of(record)),
    }
}

/// A string tag value.
///
/// # Panics
///
/// Panics if the tag is missing or not a string.
#[must_use]
pub fn string_tag(record: &RecordBuf, raw: &str) -> String {
    match record.data().get(&tag(raw)) {
        Some(Value::String(s)) => s.to_string(),
        other => panic!("{raw} on {} is not a string: {other:?}", name_of(record)),
    }
}

/// A `UInt8` array tag value.
///
/// # Panics
///
/// Panics if the tag is missing or of another type.
#[must_use]
pub fn u8_array_tag(record: &RecordBuf, raw: &str) -> Vec<u8> {
    match record.data().get(&tag(raw)) {
        Some(Value::Array(Array::UInt8(values))) => values.clone(),
        other => panic!("{raw} on {} is not a UInt8 array: {other:?}", name_of(record)),
    }
}

/// True if the record carries the tag.
#[must_use]
pub fn has_tag(record: &RecordBuf, raw: &str) -> bool {
    record.data().get(&tag(raw)).is_some()
}

/// Asserts that a fragment's sequence and per-base tracks agree in length.
///
/// # Panics
///
/// Panics if any track length differs from the sequence length.
pub fn assert_tracks_consistent(record: &RecordBuf) {
    let len = record.sequence().len();
    assert_eq!(record.quality_scores().len(), len, "quality length of {}", name_of(record));
    assert_eq!(string_tag(record, "dq").len(), len, "dq length of {}", name_of(record));
    assert_eq!(u8_array_tag(record, "ip").len(), len, "ip length of {}", name_of(record));
}

/// Asserts that `qs`/`qe` match the `start_end` range in the record's name.
///
/// # Panics
///
/// Panics if the tags disagree with the name or with the sequence length.
pub fn assert_coordinates_match_name(record: &RecordBuf) {
    let name = name_of(record);
    let range = name.rsplit('/').next().expect("name has a range");
    let (start, end) = range.split_once('_').expect("range has '_'");
    let (start, end): (i64, i64) = (start.parse().unwrap(), end.parse().unwrap());
    assert_eq!(int_tag(record, "qs"), start, "qs of {name}");
    assert_eq!(int_tag(record, "qe"), end, "qe of {name}");
    assert_eq!(end - start, record.sequence().len() as i64, "length of {name}");
}
