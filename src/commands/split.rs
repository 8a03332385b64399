//! Split PacBio subreads at internal adaptor (marker) matches.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

use refarm_lib::align::SmithWaterman;
use refarm_lib::bam_io::{create_bam_reader, create_bam_writer, finish_bam_writer};
use refarm_lib::batch_queue::BoundedBatchQueue;
use refarm_lib::header::add_pg_record;
use refarm_lib::logging::{OperationTimer, log_split_summary};
use refarm_lib::marker::resolve_marker;
use refarm_lib::metrics::write_metrics_auto;
use refarm_lib::output::OutputSerializer;
use refarm_lib::progress::ProgressTracker;
use refarm_lib::validation::{validate_distinct_paths, validate_file_exists, validate_positive};
use refarm_lib::worker::{SplitShared, run_workers};

use crate::commands::command::Command;
use crate::commands::common::{CompressionOptions, ScoringOptions, ThreadingOptions};

/// Split subreads that contain an internal SMRTbell adaptor.
#[derive(Debug, Parser)]
#[command(
    name = "split",
    about = "\x1b[38;5;72m[SPLIT]\x1b[0m          \x1b[36mSplit subreads at internal adaptor matches\x1b[0m",
    long_about = r#"
Split PacBio subreads at an internal adaptor (marker) sequence.

Each read is aligned against the marker with a local (Smith-Waterman) alignment. Reads whose
best match scores below --min-score, or beats the second-best match by less than --min-margin,
are dropped. Every other read is cut around the match. A left fragment (the bases before the
marker) is written when the match does not start at the first base. A right fragment (the bases
after the marker) is written when the polymerase-read coordinate after the match,
start + match end + 1, is still below the end coordinate in the read name.

Fragments are renamed `run/zmw/start_end` with their polymerase-read coordinates, keep the
RG, np, rq, sn and zm tags, get fresh qs/qe tags, and have the per-base dq, dt, iq, mq, sq,
ip and pw tracks sliced with the bases. The cx tag gains the adaptor-after flag (0x2) on left
fragments and the adaptor-before flag (0x1) on right fragments.

Reads that do not contain the marker are not written. Output order is not preserved.

Example usage:
  refarm split movie.subreads.bam
  refarm split movie.subreads.bam -o split.bam --threads 16 --metrics split.metrics.txt
  refarm split movie.subreads.bam --marker-fasta adaptor.fasta --min-score 60
"#
)]
pub struct Split {
    /// Input subread BAM
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output BAM [default: INPUT without `.bam`, plus `.refarm.bam`]
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Marker sequence [default: the SMRTbell adaptor]
    #[arg(short = 'm', long = "marker", conflicts_with = "marker_fasta")]
    pub marker: Option<String>,

    /// FASTA file whose first record is the marker sequence
    #[arg(long = "marker-fasta")]
    pub marker_fasta: Option<PathBuf>,

    /// Number of reads each worker takes from the input at a time
    #[arg(short = 'b', long = "batch-size", default_value_t = 200)]
    pub batch_size: usize,

    /// Optional output TSV of split metrics
    #[arg(long = "metrics")]
    pub metrics: Option<PathBuf>,

    #[command(flatten)]
    pub threading: ThreadingOptions,

    #[command(flatten)]
    pub compression: CompressionOptions,

    #[command(flatten)]
    pub scoring: ScoringOptions,
}

/// `in.subreads.bam` becomes `in.subreads.refarm.bam`; other names just gain the suffix.
fn default_output_path(input: &Path) -> PathBuf {
    let raw = input.as_os_str().to_string_lossy();
    let stem = raw.strip_suffix(".bam").unwrap_or(&raw);
    PathBuf::from(format!("{stem}.refarm.bam"))
}

impl Split {
    /// The output path, explicit or derived from the input.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| default_output_path(&self.input))
    }
}

impl Command for Split {
    fn execute(&self, command_line: &str) -> Result<()> {
        validate_file_exists(&self.input, "Input BAM")?;
        self.threading.validate()?;
        self.compression.validate()?;
        self.scoring.validate()?;
        validate_positive(self.batch_size, "batch-size")?;
        let output = self.output_path();
        validate_distinct_paths(&self.input, &output)?;
        let marker = resolve_marker(self.marker.as_deref(), self.marker_fasta.as_deref())?;
        let params = self.scoring.split_params();

        let timer = OperationTimer::new("Splitting subreads");
        info!("Input: {}", self.input.display());
        info!("Output: {}", output.display());
        info!("Marker: {} ({} bp)", String::from_utf8_lossy(&marker), marker.len());
        info!("Minimum score {}, minimum margin {}", params.min_score, params.min_margin);
        info!("{}, batch size {}", self.threading.log_message(), self.batch_size);

        let (reader, header) = create_bam_reader(&self.input, self.threading.io_threads)?;
        let header = add_pg_record(header, crate::version::VERSION, command_line)?;
        let writer = create_bam_writer(
            &output,
            &header,
            self.threading.io_threads,
            self.compression.compression_level,
        )?;

        let queue = BoundedBatchQueue::new(reader, self.batch_size);
        let serializer = OutputSerializer::new(writer);
        let progress = ProgressTracker::new("Processed reads");
        let shared = SplitShared {
            queue: &queue,
            output: &serializer,
            header: &header,
            marker: &marker,
            params: &params,
            progress: Some(&progress),
        };

        let metrics =
            run_workers(shared, self.threading.threads, || SmithWaterman::new(params.scoring))?;
        progress.log_final();
        finish_bam_writer(serializer.into_inner())?;

        log_split_summary(&metrics);
        if let Some(path) = &self.metrics {
            write_metrics_auto(path, std::slice::from_ref(&metrics))?;
            info!("Wrote split metrics to {}", path.display());
        }
        timer.log_completion(metrics.reads_examined);
        Ok(())
    }
}
