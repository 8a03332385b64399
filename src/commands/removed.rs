//! Recover the subsequences that `split` removed.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use noodles::fasta;
use noodles::sam::alignment::RecordBuf;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use refarm_lib::bam_io::create_bam_reader;
use refarm_lib::logging::{OperationTimer, format_count, log_removed_summary};
use refarm_lib::metrics::{RemovedMetrics, write_metrics_auto};
use refarm_lib::progress::ProgressTracker;
use refarm_lib::read_name::ReadName;
use refarm_lib::removed::RemovedTracker;
use refarm_lib::validation::validate_file_exists;

use crate::commands::command::Command;

/// Write the sequence removed by `split` as FASTA.
#[derive(Debug, Parser)]
#[command(
    name = "removed",
    about = "\x1b[38;5;166m[UTILITIES]\x1b[0m      \x1b[36mWrite the sequence removed by split as FASTA\x1b[0m",
    long_about = r#"
Write the sequence removed by `refarm split` as FASTA.

Reads from both BAMs are grouped by run and ZMW. The polymerase-read interval of every read in
the split BAM is subtracted from the intervals of the original reads of the same ZMW; what is
left (markers, and whole reads that were not split) is written as FASTA records named
`run/zmw/start_end`, ordered by run, ZMW and position.

Split reads from ZMWs that do not appear in the original BAM are counted and ignored.

Example usage:
  refarm removed movie.subreads.bam movie.subreads.refarm.bam -o removed.fasta
"#
)]
pub struct Removed {
    /// Original (unsplit) subread BAM
    #[arg(value_name = "ORIGINAL")]
    pub original: PathBuf,

    /// BAM written by `refarm split`
    #[arg(value_name = "REFARMED")]
    pub refarmed: PathBuf,

    /// Output FASTA
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Optional output TSV of removed-sequence metrics
    #[arg(long = "metrics")]
    pub metrics: Option<PathBuf>,
}

/// Parses the name of a record, naming the file in the error.
fn record_name(record: &RecordBuf, path: &Path) -> Result<ReadName> {
    let raw = record.name().map(|n| n.to_vec()).unwrap_or_default();
    ReadName::from_bytes(&raw)
        .with_context(|| format!("Unexpected read name in {}", path.display()))
}

/// Calls `f` with each record of a BAM file.
fn for_each_record<F>(path: &Path, message: &str, mut f: F) -> Result<()>
where
    F: FnMut(&RecordBuf) -> Result<()>,
{
    let (mut reader, header) = create_bam_reader(path, 1)?;
    let progress = ProgressTracker::new(message);
    let mut record = RecordBuf::default();
    loop {
        let n = reader
            .read_record_buf(&header, &mut record)
            .with_context(|| format!("Failed to read record from {}", path.display()))?;
        if n == 0 {
            break;
        }
        f(&record)?;
        progress.log_if_needed(1);
    }
    progress.log_final();
    Ok(())
}

/// Writes each removed segment as a FASTA record.
fn write_removed(
    tracker: RemovedTracker,
    path: &Path,
    metrics: &mut RemovedMetrics,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output FASTA: {}", path.display()))?;
    let mut output = BufWriter::new(file);
    let mut writer = fasta::io::Writer::new(&mut output);

    for (name, bases) in tracker.into_removed() {
        metrics.segments_written += 1;
        metrics.bases_written += bases.len() as u64;
        let definition = fasta::record::Definition::new(name.to_string(), None);
        let record = fasta::Record::new(definition, fasta::record::Sequence::from(bases));
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write FASTA record to {}", path.display()))?;
    }

    drop(writer);
    output.flush().with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

impl Command for Removed {
    fn execute(&self, _command_line: &str) -> Result<()> {
        validate_file_exists(&self.original, "Original BAM")?;
        validate_file_exists(&self.refarmed, "Refarmed BAM")?;

        let timer = OperationTimer::new("Collecting removed sequence");
        info!("Original: {}", self.original.display());
        info!("Refarmed: {}", self.refarmed.display());
        info!("Output: {}", self.output.display());

        let mut tracker = RemovedTracker::default();
        for_each_record(&self.original, "Loaded original reads", |record| {
            let name = record_name(record, &self.original)?;
            tracker.add_original(name, record.sequence().as_ref());
            Ok(())
        })?;

        for_each_record(&self.refarmed, "Subtracted refarmed reads", |record| {
            let name = record_name(record, &self.refarmed)?;
            if !tracker.subtract(&name) {
                log::debug!("No original reads for ZMW of {name}");
            }
            Ok(())
        })?;

        let mut metrics = RemovedMetrics {
            zmws: tracker.zmw_count() as u64,
            original_reads: tracker.original_reads(),
            refarmed_reads: tracker.subtracted_reads(),
            unknown_zmw_reads: tracker.unknown_reads(),
            ..RemovedMetrics::default()
        };
        if metrics.unknown_zmw_reads > 0 {
            warn!(
                "{} refarmed reads belong to ZMWs missing from {}",
                format_count(metrics.unknown_zmw_reads),
                self.original.display()
            );
        }

        write_removed(tracker, &self.output, &mut metrics)?;

        log_removed_summary(&metrics);
        if let Some(path) = &self.metrics {
            write_metrics_auto(path, std::slice::from_ref(&metrics))?;
        }
        timer.log_completion(metrics.original_reads + metrics.refarmed_reads);
        Ok(())
    }
}
