//! End-to-end tests of the split pipeline through the library API.
//!
//! These drive the same pieces the `split` command wires together (BAM reader, batch
//! queue, worker pool, output serializer, BAM writer) with varying thread counts and
//! batch sizes, and check that the output does not depend on either.

use refarm_lib::align::SmithWaterman;
use refarm_lib::bam_io::{create_bam_reader, create_bam_writer, finish_bam_writer};
use refarm_lib::batch_queue::BoundedBatchQueue;
use refarm_lib::marker::DEFAULT_MARKER;
use refarm_lib::metrics::SplitMetrics;
use refarm_lib::output::OutputSerializer;
use refarm_lib::progress::ProgressTracker;
use refarm_lib::worker::{SplitParams, SplitShared, run_workers};
use rstest::rstest;
use std::path::Path;
use tempfile::TempDir;

use crate::helpers::*;

/// A larger input: `n` reads cycling through the standard split outcomes, each with its own
/// ZMW number.
fn many_subreads(n: u32) -> Vec<noodles::sam::alignment::RecordBuf> {
    (0..n)
        .map(|zmw| {
            let left = flank(5 + (zmw as usize % 17));
            let right = flank(3 + (zmw as usize % 29));
            match zmw % 4 {
                0 => subread_around_marker(zmw, 0, &left, DEFAULT_MARKER, &right),
                1 => subread_around_marker(zmw, 1000, &left, DEFAULT_MARKER, ""),
                2 => subread_around_marker(zmw, 50, "", DEFAULT_MARKER, &right),
                _ => pacbio_subread(&format!("runA/{zmw}/0_70"), &flank(70)),
            }
        })
        .collect()
}

/// Runs the pipeline from `input` to `output`, returning the merged metrics.
fn run_pipeline(
    input: &Path,
    output: &Path,
    threads: usize,
    io_threads: usize,
    batch_size: usize,
) -> SplitMetrics {
    let (reader, header) = create_bam_reader(input, io_threads).unwrap();
    let writer = create_bam_writer(output, &header, io_threads, 1).unwrap();

    let queue = BoundedBatchQueue::new(reader, batch_size);
    let serializer = OutputSerializer::new(writer);
    let params = SplitParams::default();
    let progress = ProgressTracker::new("Processed reads").with_interval(50);
    let shared = SplitShared {
        queue: &queue,
        output: &serializer,
        header: &header,
        marker: DEFAULT_MARKER.as_bytes(),
        params: &params,
        progress: Some(&progress),
    };

    let metrics = run_workers(shared, threads, || SmithWaterman::new(params.scoring)).unwrap();
    finish_bam_writer(serializer.into_inner()).unwrap();
    assert!(queue.is_exhausted());
    assert_eq!(progress.count(), metrics.reads_examined);
    metrics
}

#[rstest]
#[case(1, 1, 200)]
#[case(4, 1, 1)]
#[case(4, 1, 7)]
#[case(8, 2, 16)]
#[case(3, 4, 1000)]
fn test_output_independent_of_threads_and_batches(
    #[case] threads: usize,
    #[case] io_threads: usize,
    #[case] batch_size: usize,
) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    write_bam(&input, &subread_header(), &many_subreads(400));

    let baseline = dir.path().join("baseline.bam");
    let expected_metrics = run_pipeline(&input, &baseline, 1, 1, 200);

    let output = dir.path().join("output.bam");
    let metrics = run_pipeline(&input, &output, threads, io_threads, batch_size);
    assert_eq!(metrics, expected_metrics);

    let expected = read_bam_sorted(&baseline);
    let actual = read_bam_sorted(&output);
    assert_eq!(names_of(&actual), names_of(&expected));
    for (a, e) in actual.iter().zip(&expected) {
        assert_eq!(a.sequence(), e.sequence());
        assert_eq!(a.data(), e.data());
    }
}

#[test]
fn test_pipeline_metrics() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let output = dir.path().join("output.bam");
    write_bam(&input, &subread_header(), &many_subreads(400));

    let metrics = run_pipeline(&input, &output, 4, 1, 10);

    // 100 reads of each kind: both sides, left only, right only, no marker.
    assert_eq!(metrics.reads_examined, 400);
    assert_eq!(metrics.reads_low_score, 100);
    assert_eq!(metrics.reads_low_margin, 0);
    assert_eq!(metrics.reads_not_split, 0);
    assert_eq!(metrics.reads_split, 300);
    assert_eq!(metrics.left_fragments, 200);
    assert_eq!(metrics.right_fragments, 200);

    let records = read_bam_sorted(&output);
    assert_eq!(records.len() as u64, metrics.fragments_written());
    let bases: u64 = records.iter().map(|r| r.sequence().len() as u64).sum();
    assert_eq!(bases, metrics.bases_written);
    for record in &records {
        assert_tracks_consistent(record);
        assert_coordinates_match_name(record);
    }
}
