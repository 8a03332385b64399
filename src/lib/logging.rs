//! Formatting helpers and run summaries for log output.

use std::time::{Duration, Instant};

use crate::metrics::{ProcessingMetrics, RemovedMetrics, SplitMetrics};

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use refarm_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction (0.0-1.0) as a percentage with `decimals` decimal places.
///
/// # Examples
///
/// ```
/// use refarm_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration as e.g. `45s`, `2m 15s` or `1h 30m`.
///
/// # Examples
///
/// ```
/// use refarm_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a processing rate, switching to per-minute units below one item per second.
///
/// # Examples
///
/// ```
/// use refarm_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 reads/s");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} reads/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} reads/s", format_count(rate as u64))
    } else {
        let per_min = count as f64 / (secs / 60.0);
        format!("{per_min:.1} reads/min")
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

/// Logs a summary of a `split` run.
pub fn log_split_summary(metrics: &SplitMetrics) {
    let examined = metrics.reads_examined;
    log::info!("Split Summary:");
    log::info!("  Reads examined: {}", format_count(examined));
    log::info!(
        "  Reads split: {} ({})",
        format_count(metrics.reads_split),
        format_percent(fraction(metrics.reads_split, examined), 2)
    );
    log::info!(
        "  Skipped, marker score too low: {} ({})",
        format_count(metrics.reads_low_score),
        format_percent(fraction(metrics.reads_low_score, examined), 2)
    );
    log::info!(
        "  Skipped, marker match ambiguous: {} ({})",
        format_count(metrics.reads_low_margin),
        format_percent(fraction(metrics.reads_low_margin, examined), 2)
    );
    log::info!(
        "  Reads passing thresholds: {}",
        format_percent(metrics.efficiency() / 100.0, 2)
    );
    if metrics.reads_not_split > 0 {
        log::info!(
            "  Marker not internal to read: {}",
            format_count(metrics.reads_not_split)
        );
    }
    log::info!(
        "  Fragments written: {} (left {}, right {})",
        format_count(metrics.fragments_written()),
        format_count(metrics.left_fragments),
        format_count(metrics.right_fragments)
    );
    log::info!("  Bases written: {}", format_count(metrics.bases_written));
}

/// Logs a summary of a `removed` run.
pub fn log_removed_summary(metrics: &RemovedMetrics) {
    log::info!("Removed Sequence Summary:");
    log::info!("  ZMWs: {}", format_count(metrics.zmws));
    log::info!("  Original reads: {}", format_count(metrics.original_reads));
    log::info!("  Split reads subtracted: {}", format_count(metrics.refarmed_reads));
    if metrics.unknown_zmw_reads > 0 {
        log::warn!(
            "  Split reads from ZMWs missing in the original input: {}",
            format_count(metrics.unknown_zmw_reads)
        );
    }
    log::info!(
        "  Removed segments: {} ({} bases)",
        format_count(metrics.segments_written),
        format_count(metrics.bases_written)
    );
}

/// Operation timing and summary helper.
///
/// # Examples
///
/// ```no_run
/// use refarm_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Splitting reads");
/// // ... do work ...
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Time elapsed since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs the completion with item count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.elapsed();
        log::info!(
            "{} completed: {} reads in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
