//! Input validation utilities
//!
//! Checks for command-line parameters and file paths, run before any BAM is opened so
//! configuration mistakes fail fast with a [`RefarmError`].

use crate::errors::{RefarmError, Result};
use std::fmt::Display;
use std::path::{Component, Path};

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use refarm_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bam", "Input BAM");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RefarmError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that a value is positive (> 0)
///
/// # Example
/// ```
/// use refarm_lib::validation::validate_positive;
///
/// validate_positive(200, "batch-size").unwrap();
/// assert!(validate_positive(0, "batch-size").is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(RefarmError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

/// Validate that `value` lies in `min..=max`.
#[allow(clippy::needless_pass_by_value)]
pub fn validate_range<T: PartialOrd + Display>(value: T, min: T, max: T, name: &str) -> Result<()> {
    if value < min || value > max {
        return Err(RefarmError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be between {min} and {max}, got: {value}"),
        });
    }
    Ok(())
}

/// Validate that the output path does not overwrite the input.
///
/// # Example
/// ```
/// use refarm_lib::validation::validate_distinct_paths;
///
/// validate_distinct_paths("in.bam", "in.refarm.bam").unwrap();
/// assert!(validate_distinct_paths("in.bam", "./in.bam").is_err());
/// ```
pub fn validate_distinct_paths<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => {
            fn parts(p: &Path) -> Vec<Component<'_>> {
                p.components().filter(|c| !matches!(c, Component::CurDir)).collect()
            }
            parts(input) == parts(output)
        }
    };
    if same {
        return Err(RefarmError::InvalidParameter {
            parameter: "output".to_string(),
            reason: format!("Output '{}' would overwrite the input", output.display()),
        });
    }
    Ok(())
}

/// Validate a marker sequence and return it upper-cased.
///
/// The marker must be non-empty and contain only `A`, `C`, `G`, `T` or `N` (any case).
///
/// # Example
/// ```
/// use refarm_lib::validation::validate_marker;
///
/// assert_eq!(validate_marker(b"acgtN", "marker").unwrap(), b"ACGTN");
/// assert!(validate_marker(b"", "marker").is_err());
/// assert!(validate_marker(b"ACXT", "marker").is_err());
/// ```
pub fn validate_marker(bases: &[u8], name: &str) -> Result<Vec<u8>> {
    if bases.is_empty() {
        return Err(RefarmError::InvalidParameter {
            parameter: name.to_string(),
            reason: "Marker sequence is empty".to_string(),
        });
    }
    let marker = bases.to_ascii_uppercase();
    if let Some(pos) = marker.iter().position(|b| !matches!(b, b'A' | b'C' | b'G' | b'T' | b'N')) {
        return Err(RefarmError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Invalid base '{}' at position {pos}", char::from(bases[pos])),
        });
    }
    Ok(marker)
}
