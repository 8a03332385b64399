//! Integration tests for the split command.

use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::header::record::value::map::program::tag as pg_tag;
use refarm_lib::marker::DEFAULT_MARKER;
use refarm_lib::metrics::SplitMetrics;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

use crate::helpers::*;

/// Runs `refarm split` on `records` and returns the output records sorted by name.
fn split(dir: &TempDir, records: &[RecordBuf], extra: &[&str]) -> Vec<RecordBuf> {
    let input = dir.path().join("movie.subreads.bam");
    let output = dir.path().join("movie.subreads.refarm.bam");
    write_bam(&input, &subread_header(), records);

    let mut args = vec!["split", input.to_str().unwrap()];
    args.extend_from_slice(extra);
    let result = run_refarm(&args);
    assert!(
        result.status.success(),
        "split failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    read_bam_sorted(&output)
}

#[test]
fn test_split_standard_reads() {
    let dir = TempDir::new().unwrap();
    let records = split(&dir, &standard_subreads(), &["--threads", "2"]);

    assert_eq!(
        names_of(&records),
        vec!["runA/11/200_230", "runA/13/345_370", "runA/42/1000_1010", "runA/42/1055_1095"]
    );
    for record in &records {
        assert_tracks_consistent(record);
        assert_coordinates_match_name(record);
        assert!(record.flags().is_unmapped());
    }
}

#[test]
fn test_fragment_tags() {
    let dir = TempDir::new().unwrap();
    let records = split(&dir, &standard_subreads(), &[]);
    let left = records.iter().find(|r| name_of(r) == "runA/42/1000_1010").unwrap();
    let right = records.iter().find(|r| name_of(r) == "runA/42/1055_1095").unwrap();

    // Left fragment: bases before the marker, adaptor-after flag.
    assert_eq!(left.sequence().as_ref(), flank(10).as_bytes());
    assert_eq!(int_tag(left, "cx"), 2);
    assert_eq!(u8_array_tag(left, "ip"), (0..10).collect::<Vec<u8>>());

    // Right fragment: bases after the marker, adaptor-before flag.
    assert_eq!(right.sequence().as_ref(), flank(40).as_bytes());
    assert_eq!(int_tag(right, "cx"), 1);
    assert_eq!(u8_array_tag(right, "ip"), (55..95).collect::<Vec<u8>>());

    for fragment in [left, right] {
        assert_eq!(string_tag(fragment, "RG"), "rg1");
        assert_eq!(int_tag(fragment, "np"), 12);
        assert_eq!(int_tag(fragment, "zm"), 42);
        assert!(has_tag(fragment, "rq"));
        assert!(has_tag(fragment, "sn"));
        assert!(has_tag(fragment, "pw"));
        assert!(!has_tag(fragment, "XX"));
    }
}

#[test]
fn test_existing_context_flags_are_kept() {
    let dir = TempDir::new().unwrap();
    let mut record = subread_around_marker(3, 0, &flank(12), DEFAULT_MARKER, &flank(12));
    record.data_mut().insert(Tag::new(b'c', b'x'), Value::UInt8(0x4));

    let records = split(&dir, &[record], &[]);
    assert_eq!(names_of(&records), vec!["runA/3/0_12", "runA/3/57_69"]);
    assert_eq!(int_tag(&records[0], "cx"), 0x4 | 0x2);
    assert_eq!(int_tag(&records[1], "cx"), 0x4 | 0x1);
}

#[test]
fn test_output_header_has_chained_program() {
    let dir = TempDir::new().unwrap();
    split(&dir, &standard_subreads(), &[]);

    let (header, _) = read_bam(&dir.path().join("movie.subreads.refarm.bam"));
    let programs = header.programs();
    let refarm = programs.as_ref().get(b"refarm".as_slice()).expect("refarm @PG");
    let pp = refarm.other_fields().get(&pg_tag::PREVIOUS_PROGRAM_ID).map(ToString::to_string);
    assert_eq!(pp.as_deref(), Some("baz2bam"));
    assert!(header.read_groups().contains_key(b"rg1".as_slice()));
}

#[test]
fn test_thresholds_control_splitting() {
    let dir = TempDir::new().unwrap();

    // The full marker scores 90, so a threshold above that rejects everything.
    let records = split(&dir, &standard_subreads(), &["--min-score", "91"]);
    assert!(records.is_empty());

    // With no margin requirement the ambiguous read is split at one of its copies.
    let records = split(&dir, &standard_subreads(), &["--min-margin", "0"]);
    assert!(names_of(&records).iter().any(|n| n.starts_with("runA/15/")));
}

#[test]
fn test_custom_marker() {
    let dir = TempDir::new().unwrap();
    let marker = "TTTTTAAAAATTTTTAAAAATTTTTAAAAATTTTT";
    let record = subread_around_marker(5, 100, &flank(20), marker, &flank(20));

    let records = split(&dir, &[record.clone()], &["--marker", &marker.to_lowercase()]);
    assert_eq!(names_of(&records), vec!["runA/5/100_120", "runA/5/155_175"]);

    // The default marker is not in this read.
    let records = split(&dir, &[record], &[]);
    assert!(records.is_empty());
}

#[test]
fn test_marker_from_fasta() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("adaptor.fasta");
    let mut file = fs::File::create(&fasta).unwrap();
    writeln!(file, ">smrtbell\n{}\n{}", &DEFAULT_MARKER[..20], &DEFAULT_MARKER[20..]).unwrap();
    drop(file);

    let records = split(&dir, &standard_subreads(), &["--marker-fasta", fasta.to_str().unwrap()]);
    assert_eq!(records.len(), 4);
}

#[test]
fn test_metrics_file() {
    let dir = TempDir::new().unwrap();
    let metrics_path = dir.path().join("split.metrics.txt");
    split(&dir, &standard_subreads(), &["--metrics", metrics_path.to_str().unwrap()]);

    let metrics: Vec<SplitMetrics> =
        fgoxide::io::DelimFile::default().read_tsv(&metrics_path).unwrap();
    assert_eq!(
        metrics,
        vec![SplitMetrics {
            reads_examined: 6,
            reads_low_score: 1,
            reads_low_margin: 1,
            reads_not_split: 1,
            reads_split: 3,
            left_fragments: 2,
            right_fragments: 2,
            bases_written: 105,
        }]
    );
}

#[test]
fn test_explicit_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bam");
    let output = dir.path().join("custom.bam");
    write_bam(&input, &subread_header(), &standard_subreads());

    let result = run_refarm(&["split", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(result.status.success());
    assert_eq!(read_bam_sorted(&output).len(), 4);
    assert!(!dir.path().join("in.refarm.bam").exists());
}

#[test]
fn test_empty_input() {
    let dir = TempDir::new().unwrap();
    let records = split(&dir, &[], &[]);
    assert!(records.is_empty());
}

#[test]
fn test_malformed_read_name_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bam");
    let sequence = format!("{}{DEFAULT_MARKER}{}", flank(10), flank(10));
    let mut record = pacbio_subread("runA/1/0_65", &sequence);
    *record.name_mut() = Some("not-a-subread-name".into());
    write_bam(&input, &subread_header(), &[record]);

    let result = run_refarm(&["split", input.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("not-a-subread-name"));
}

#[test]
fn test_configuration_errors() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bam");
    write_bam(&input, &subread_header(), &standard_subreads());
    let input = input.to_str().unwrap();

    for args in [
        vec!["split", "/nonexistent/in.bam"],
        vec!["split", input, "--threads", "0"],
        vec!["split", input, "--batch-size", "0"],
        vec!["split", input, "--marker", "ACGTX"],
        vec!["split", input, "--gap-extend", "2147483647"],
        vec!["split", input, "--match-score", "1001"],
        vec!["split", input, "--marker", "ACGT", "--marker-fasta", input],
        vec!["split", input, "-o", input],
    ] {
        let result = run_refarm(&args);
        assert!(!result.status.success(), "accepted {args:?}");
    }
    assert!(!dir.path().join("in.refarm.bam").exists());
}
