//! Integration tests for the removed command.

use noodles::fasta;
use refarm_lib::marker::DEFAULT_MARKER;
use refarm_lib::metrics::RemovedMetrics;
use std::path::Path;
use tempfile::TempDir;

use crate::helpers::*;

/// Reads `(name, sequence)` pairs from a FASTA file.
fn read_fasta(path: &Path) -> Vec<(String, String)> {
    let mut reader = fasta::io::reader::Builder.build_from_path(path).expect("open FASTA");
    reader
        .records()
        .map(|r| {
            let record = r.expect("read FASTA record");
            let name = String::from_utf8_lossy(record.name()).into_owned();
            let sequence = String::from_utf8_lossy(record.sequence().as_ref()).into_owned();
            (name, sequence)
        })
        .collect()
}

/// Splits the standard reads and runs `removed` on the result.
fn split_then_removed(dir: &TempDir, extra: &[&str]) -> Vec<(String, String)> {
    let original = dir.path().join("movie.subreads.bam");
    let refarmed = dir.path().join("movie.subreads.refarm.bam");
    let output = dir.path().join("removed.fasta");
    write_bam(&original, &subread_header(), &standard_subreads());

    let result = run_refarm(&["split", original.to_str().unwrap()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let mut args = vec![
        "removed",
        original.to_str().unwrap(),
        refarmed.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    let result = run_refarm(&args);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    read_fasta(&output)
}

#[test]
fn test_removed_sequence_after_split() {
    let dir = TempDir::new().unwrap();
    let removed = split_then_removed(&dir, &[]);

    let names: Vec<&str> = removed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "runA/11/230_275",
            "runA/13/300_345",
            "runA/15/0_170",
            "runA/42/1010_1055",
            "runA/7/0_45",
            "runA/9/0_60",
        ]
    );

    // Wherever a read was split, exactly the marker was removed.
    for (name, sequence) in &removed {
        if ["runA/11/", "runA/13/", "runA/42/", "runA/7/"].iter().any(|p| name.starts_with(p)) {
            assert_eq!(sequence, DEFAULT_MARKER, "removed sequence of {name}");
        }
    }
    assert_eq!(removed[5].1, flank(60));
}

#[test]
fn test_removed_metrics() {
    let dir = TempDir::new().unwrap();
    let metrics_path = dir.path().join("removed.metrics.txt");
    split_then_removed(&dir, &["--metrics", metrics_path.to_str().unwrap()]);

    let metrics: Vec<RemovedMetrics> =
        fgoxide::io::DelimFile::default().read_tsv(&metrics_path).unwrap();
    assert_eq!(
        metrics,
        vec![RemovedMetrics {
            zmws: 6,
            original_reads: 6,
            refarmed_reads: 4,
            unknown_zmw_reads: 0,
            segments_written: 6,
            bases_written: 45 * 4 + 170 + 60,
        }]
    );
}

#[test]
fn test_unknown_zmws_are_ignored() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("original.bam");
    let refarmed = dir.path().join("refarmed.bam");
    let output = dir.path().join("removed.fasta");

    write_bam(&original, &subread_header(), &[pacbio_subread("runA/1/0_20", &flank(20))]);
    write_bam(
        &refarmed,
        &subread_header(),
        &[pacbio_subread("runA/1/5_10", &flank(5)), pacbio_subread("runA/2/0_5", &flank(5))],
    );

    let result = run_refarm(&[
        "removed",
        original.to_str().unwrap(),
        refarmed.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(String::from_utf8_lossy(&result.stderr).contains("missing from"));

    let removed = read_fasta(&output);
    let flank = flank(20);
    assert_eq!(
        removed,
        vec![
            ("runA/1/0_5".to_string(), flank[0..5].to_string()),
            ("runA/1/10_20".to_string(), flank[10..20].to_string()),
        ]
    );
}

#[test]
fn test_missing_refarmed_bam_fails() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("original.bam");
    write_bam(&original, &subread_header(), &standard_subreads());

    let result = run_refarm(&[
        "removed",
        original.to_str().unwrap(),
        "/nonexistent/refarmed.bam",
        "-o",
        dir.path().join("out.fasta").to_str().unwrap(),
    ]);
    assert!(!result.status.success());
}
