//! Custom error types for refarm operations.

use thiserror::Error;

/// Result type alias for refarm operations
pub type Result<T> = std::result::Result<T, RefarmError>;

/// Error type for refarm operations
#[derive(Error, Debug)]
pub enum RefarmError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "BAM", "FASTA")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A read name that does not follow the `run/zmw/start_end` convention
    #[error("Invalid read name '{name}': {reason}")]
    InvalidReadName {
        /// The offending read name
        name: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A fragment coordinate that cannot be stored in a 32-bit `qs`/`qe` tag
    #[error("Coordinate {value} for read '{name}' does not fit in a 32-bit tag")]
    CoordinateOverflow {
        /// The read name of the fragment
        name: String,
        /// The coordinate value
        value: u64,
    },
}
