//! Common CLI options shared across commands.
//!
//! Argument groups composed into command structs with `#[command(flatten)]`.

use clap::Args;

use refarm_lib::align::{MAX_SCORING_VALUE, Scoring};
use refarm_lib::validation::{validate_positive, validate_range};
use refarm_lib::worker::{DEFAULT_MIN_MARGIN, DEFAULT_MIN_SCORE, SplitParams};

/// Worker and BGZF thread counts.
#[derive(Debug, Clone, Args)]
pub struct ThreadingOptions {
    /// Number of split worker threads
    #[arg(short = 't', long = "threads", default_value_t = ThreadingOptions::DEFAULT_THREADS)]
    pub threads: usize,

    /// Threads for BGZF compression and decompression (1 disables multithreaded BGZF)
    #[arg(long = "io-threads", default_value_t = 1)]
    pub io_threads: usize,
}

impl Default for ThreadingOptions {
    fn default() -> Self {
        Self { threads: Self::DEFAULT_THREADS, io_threads: 1 }
    }
}

impl ThreadingOptions {
    /// Default number of worker threads.
    pub const DEFAULT_THREADS: usize = 8;

    /// Validates that both thread counts are positive.
    ///
    /// # Errors
    ///
    /// Returns an error if either count is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_positive(self.threads, "threads")?;
        validate_positive(self.io_threads, "io-threads")?;
        Ok(())
    }

    /// Returns a log message describing the threading configuration.
    #[must_use]
    pub fn log_message(&self) -> String {
        if self.io_threads > 1 {
            format!("Using {} worker threads, {} BGZF threads", self.threads, self.io_threads)
        } else {
            format!("Using {} worker threads", self.threads)
        }
    }
}

/// Options for output compression.
///
/// Controls BGZF compression level for BAM output files.
#[derive(Debug, Clone, Args)]
pub struct CompressionOptions {
    /// Compression level for output BAM (0-9).
    ///
    /// Level 1 is fastest with larger files; level 9 produces the smallest files.
    #[arg(long, default_value_t = 1)]
    pub compression_level: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self { compression_level: 1 }
    }
}

impl CompressionOptions {
    /// Validates that the level is a valid BGZF level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level exceeds 9.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_range(self.compression_level, 0, 9, "compression-level")?;
        Ok(())
    }
}

/// Marker alignment scoring and confidence thresholds.
#[derive(Debug, Clone, Args)]
pub struct ScoringOptions {
    /// Score for a matching base
    #[arg(long = "match-score", default_value_t = 2)]
    pub match_score: i32,

    /// Penalty for a mismatching base
    #[arg(long = "mismatch-penalty", default_value_t = 2)]
    pub mismatch_penalty: i32,

    /// Penalty for opening a gap
    #[arg(long = "gap-open", default_value_t = 3)]
    pub gap_open: i32,

    /// Penalty for extending a gap
    #[arg(long = "gap-extend", default_value_t = 1)]
    pub gap_extend: i32,

    /// Minimum alignment score for a marker match to be used
    #[arg(long = "min-score", default_value_t = DEFAULT_MIN_SCORE)]
    pub min_score: i32,

    /// Minimum difference between the best and second-best marker scores
    #[arg(long = "min-margin", default_value_t = DEFAULT_MIN_MARGIN)]
    pub min_margin: i32,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        let scoring = Scoring::default();
        Self {
            match_score: scoring.match_score,
            mismatch_penalty: scoring.mismatch_penalty,
            gap_open: scoring.gap_open_penalty,
            gap_extend: scoring.gap_extend_penalty,
            min_score: DEFAULT_MIN_SCORE,
            min_margin: DEFAULT_MIN_MARGIN,
        }
    }
}

impl ScoringOptions {
    /// Validates the scoring scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if the match score or a penalty lies outside
    /// `0..=MAX_SCORING_VALUE` (the match score must also be positive), or a threshold is
    /// negative.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_range(self.match_score, 1, MAX_SCORING_VALUE, "match-score")?;
        for (value, name) in [
            (self.mismatch_penalty, "mismatch-penalty"),
            (self.gap_open, "gap-open"),
            (self.gap_extend, "gap-extend"),
        ] {
            validate_range(value, 0, MAX_SCORING_VALUE, name)?;
        }
        validate_range(self.min_score, 0, i32::MAX, "min-score")?;
        validate_range(self.min_margin, 0, i32::MAX, "min-margin")?;
        Ok(())
    }

    /// The worker parameters described by these options.
    #[must_use]
    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            scoring: Scoring {
                match_score: self.match_score,
                mismatch_penalty: self.mismatch_penalty,
                gap_open_penalty: self.gap_open,
                gap_extend_penalty: self.gap_extend,
            },
            min_score: self.min_score,
            min_margin: self.min_margin,
        }
    }
}
