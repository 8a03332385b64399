//! Utilities for generating subread BAMs programmatically.

#![allow(dead_code)]

use bstr::BString;
use noodles::bam;
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::data::field::value::Array;
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::{Program, ReadGroup};
use refarm_lib::marker::DEFAULT_MARKER;
use refarm_lib::sam::SubreadBuilder;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Output};

/// Bases flanking the marker in test reads; GC-rich so they never resemble the marker.
pub const FLANK: &str = "GCCGTGACGGCAGCGTCCGGCAGGCCGTAGCCGGCGTCGGACCGCAGGCG";

/// The first `len` bases of the flank pattern, repeated as needed.
#[must_use]
pub fn flank(len: usize) -> String {
    FLANK.chars().cycle().take(len).collect()
}

/// A header like the one on PacBio subread BAMs: one read group and one program.
#[must_use]
pub fn subread_header() -> Header {
    let program = Map::<Program>::default();
    Header::builder()
        .add_read_group(BString::from("rg1"), Map::<ReadGroup>::default())
        .add_program(BString::from("baz2bam"), program)
        .build()
}

/// A subread carrying the usual PacBio tags, with per-base tracks as long as `sequence`.
///
/// `name` must be `run/zmw/start_end`; `qs`/`qe` are set from it.
#[must_use]
pub fn pacbio_subread(name: &str, sequence: &str) -> RecordBuf {
    let len = sequence.len();
    let (start, end) = name
        .rsplit('/')
        .next()
        .and_then(|range| range.split_once('_'))
        .map(|(s, e)| (s.parse::<i32>().unwrap(), e.parse::<i32>().unwrap()))
        .expect("name must end in start_end");

    let dq: String = (0..len).map(|i| char::from(b'!' + (i % 40) as u8)).collect();
    let ip: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    let pw: Vec<u16> = (0..len).map(|i| i as u16).collect();

    SubreadBuilder::new(name)
        .sequence(sequence)
        .qualities(&vec![30; len])
        .tag("RG", "rg1")
        .tag("np", Value::Int32(12))
        .tag("rq", Value::Float(0.8))
        .tag("sn", Value::Array(Array::Float(vec![5.1, 9.2, 4.3, 7.4])))
        .tag("zm", Value::Int32(42))
        .tag("qs", Value::Int32(start))
        .tag("qe", Value::Int32(end))
        .tag("cx", Value::UInt8(0))
        .tag("dq", dq.as_str())
        .tag("ip", Value::Array(Array::UInt8(ip)))
        .tag("pw", Value::Array(Array::UInt16(pw)))
        .tag("XX", "dropped")
        .build()
}

/// `left + marker + right`, named from `origin_start` over the whole read.
#[must_use]
pub fn subread_around_marker(
    zmw: u32,
    origin_start: u64,
    left: &str,
    marker: &str,
    right: &str,
) -> RecordBuf {
    let sequence = format!("{left}{marker}{right}");
    let end = origin_start + sequence.len() as u64;
    pacbio_subread(&format!("runA/{zmw}/{origin_start}_{end}"), &sequence)
}

/// The reads used by most command tests, one per split outcome.
///
/// - zmw 42: marker in the middle (10 bp left, 40 bp right)
/// - zmw 7: the read is only the marker
/// - zmw 9: no marker at all
/// - zmw 11: marker at the end (left fragment only)
/// - zmw 13: marker at the start (right fragment only)
/// - zmw 15: two copies of the marker (ambiguous)
#[must_use]
pub fn standard_subreads() -> Vec<RecordBuf> {
    vec![
        subread_around_marker(42, 1000, &flank(10), DEFAULT_MARKER, &flank(40)),
        subread_around_marker(7, 0, "", DEFAULT_MARKER, ""),
        pacbio_subread("runA/9/0_60", &flank(60)),
        subread_around_marker(11, 200, &flank(30), DEFAULT_MARKER, ""),
        subread_around_marker(13, 300, "", DEFAULT_MARKER, &flank(25)),
        subread_around_marker(
            15,
            0,
            &flank(20),
            &format!("{DEFAULT_MARKER}{}{DEFAULT_MARKER}", flank(40)),
            &flank(20),
        ),
    ]
}

/// Writes `records` to a BAM at `path`.
pub fn write_bam(path: &Path, header: &Header, records: &[RecordBuf]) {
    let mut writer = bam::io::Writer::new(File::create(path).expect("Failed to create BAM file"));
    writer.write_header(header).expect("Failed to write header");
    for record in records {
        writer.write_alignment_record(header, record).expect("Failed to write record");
    }
    writer.finish(header).expect("Failed to finish BAM");
}

/// Reads the header and all records of a BAM.
#[must_use]
pub fn read_bam(path: &Path) -> (Header, Vec<RecordBuf>) {
    let mut reader = bam::io::reader::Builder.build_from_path(path).expect("Failed to open BAM");
    let header = reader.read_header().expect("Failed to read header");
    let records =
        reader.record_bufs(&header).map(|r| r.expect("Failed to read record")).collect();
    (header, records)
}

/// Reads the records of a BAM, sorted by name.
#[must_use]
pub fn read_bam_sorted(path: &Path) -> Vec<RecordBuf> {
    let (_, mut records) = read_bam(path);
    records.sort_by(|a, b| a.name().cmp(&b.name()));
    records
}

/// Runs the `refarm` binary with `args`.
#[must_use]
pub fn run_refarm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_refarm"))
        .args(args)
        .output()
        .expect("Failed to run refarm")
}
