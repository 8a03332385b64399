//! The marker sequence searched for inside each subread.

use anyhow::{Context, Result, bail};
use noodles::fasta;
use std::path::Path;

use crate::validation::validate_marker;

/// The PacBio SMRTbell adaptor, used when no marker is given.
pub const DEFAULT_MARKER: &str = "ATCTCTCTCAATTTTTTTTTTTTTTTTTTTTTTTAAGAGAGAGAT";

/// Reads the first record of a FASTA file and validates it as a marker.
///
/// Any further records are ignored.
pub fn read_marker_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut reader = fasta::io::reader::Builder
        .build_from_path(path)
        .with_context(|| format!("Failed to open marker FASTA: {}", path.display()))?;

    let Some(record) = reader.records().next() else {
        bail!("Marker FASTA contains no records: {}", path.display());
    };
    let record =
        record.with_context(|| format!("Failed to read marker FASTA: {}", path.display()))?;

    let marker = validate_marker(record.sequence().as_ref(), "marker-fasta")?;
    log::debug!(
        "Using marker '{}' ({} bp) from {}",
        String::from_utf8_lossy(record.name()),
        marker.len(),
        path.display()
    );
    Ok(marker)
}

/// Resolves the marker from either an explicit sequence or a FASTA file.
pub fn resolve_marker<P: AsRef<Path>>(
    sequence: Option<&str>,
    fasta_path: Option<P>,
) -> Result<Vec<u8>> {
    match (sequence, fasta_path) {
        (Some(_), Some(_)) => bail!("--marker and --marker-fasta cannot both be given"),
        (_, Some(path)) => read_marker_fasta(path),
        (sequence, None) => {
            Ok(validate_marker(sequence.unwrap_or(DEFAULT_MARKER).as_bytes(), "marker")?)
        }
    }
}
