//! Parsing and formatting of PacBio subread names.
//!
//! Subread names encode the movie (run) name, the ZMW hole number and the
//! half-open range of polymerase-read coordinates the subread was cut from:
//!
//! ```text
//! m54006_160504_020705/4194371/1000_1100
//! ^ run name           ^ zmw   ^ start_end
//! ```
//!
//! Every coordinate computed when splitting a subread is relative to `start`, so a
//! name that cannot be parsed leaves the split undefined and is reported as an error.

use std::fmt;

use crate::errors::{RefarmError, Result};

/// A parsed subread name: `run_name/zmw/origin_start_origin_end`.
///
/// # Examples
///
/// ```
/// use refarm_lib::read_name::ReadName;
///
/// let name = ReadName::parse("runA/42/1000_1100").unwrap();
/// assert_eq!(name.run_name(), "runA");
/// assert_eq!(name.zmw(), "42");
/// assert_eq!(name.origin_start(), 1000);
/// assert_eq!(name.origin_end(), 1100);
/// assert_eq!(name.with_range(1000, 1010).to_string(), "runA/42/1000_1010");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadName {
    run_name: String,
    zmw: String,
    origin_start: u64,
    origin_end: u64,
}

impl ReadName {
    /// Parses a name of the form `run/zmw/start_end`.
    ///
    /// Fields after the third `/` and after the first `_` of the range are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RefarmError::InvalidReadName`] if there are fewer than three
    /// `/`-delimited fields, the range has no `_`, either coordinate is not an
    /// unsigned integer, or the range is empty.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason: String| RefarmError::InvalidReadName { name: name.to_string(), reason };

        let mut fields = name.split('/');
        let (Some(run_name), Some(zmw), Some(range)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid("expected at least 3 '/'-delimited fields".to_string()));
        };

        let mut bounds = range.split('_');
        let (Some(start), Some(end)) = (bounds.next(), bounds.next()) else {
            return Err(invalid(format!("range '{range}' is not of the form start_end")));
        };

        let origin_start: u64 =
            start.parse().map_err(|_| invalid(format!("start '{start}' is not an integer")))?;
        let origin_end: u64 =
            end.parse().map_err(|_| invalid(format!("end '{end}' is not an integer")))?;

        if origin_end <= origin_start {
            return Err(invalid(format!("end {origin_end} must be greater than start {origin_start}")));
        }

        Ok(Self { run_name: run_name.to_string(), zmw: zmw.to_string(), origin_start, origin_end })
    }

    /// Parses a name stored as raw bytes (as found in a BAM record).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or the name cannot be parsed.
    pub fn from_bytes(name: &[u8]) -> Result<Self> {
        let name = std::str::from_utf8(name).map_err(|_| RefarmError::InvalidReadName {
            name: String::from_utf8_lossy(name).into_owned(),
            reason: "name is not valid UTF-8".to_string(),
        })?;
        Self::parse(name)
    }

    /// The movie/run name.
    #[must_use]
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// The ZMW hole number, kept verbatim.
    #[must_use]
    pub fn zmw(&self) -> &str {
        &self.zmw
    }

    /// First polymerase-read coordinate covered by the read (inclusive).
    #[must_use]
    pub fn origin_start(&self) -> u64 {
        self.origin_start
    }

    /// Last polymerase-read coordinate covered by the read (exclusive).
    #[must_use]
    pub fn origin_end(&self) -> u64 {
        self.origin_end
    }

    /// Returns a name for the same run and ZMW covering `[start, end)`.
    #[must_use]
    pub fn with_range(&self, start: u64, end: u64) -> Self {
        Self {
            run_name: self.run_name.clone(),
            zmw: self.zmw.clone(),
            origin_start: start,
            origin_end: end,
        }
    }
}

impl fmt::Display for ReadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}_{}", self.run_name, self.zmw, self.origin_start, self.origin_end)
    }
}

impl std::str::FromStr for ReadName {
    type Err = RefarmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
