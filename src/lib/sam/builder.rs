//! Builders for constructing subread records in tests and benchmarks.
//!
//! # Examples
//!
//! ```rust
//! use refarm_lib::sam::builder::SubreadBuilder;
//!
//! let record = SubreadBuilder::new("runA/42/1000_1010")
//!     .sequence("ACGTACGTAC")
//!     .qualities(&[30; 10])
//!     .tag("zm", 42i32)
//!     .tag("dq", "##########")
//!     .build();
//!
//! assert_eq!(record.sequence().len(), 10);
//! ```

use bstr::BString;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{Data, QualityScores, RecordBuf, Sequence};

/// Fluent builder for unaligned PacBio subread records.
#[derive(Debug, Clone)]
pub struct SubreadBuilder {
    name: String,
    sequence: Vec<u8>,
    qualities: Option<Vec<u8>>,
    flags: Flags,
    data: Data,
}

impl SubreadBuilder {
    /// Starts a new unmapped record with the given read name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: Vec::new(),
            qualities: None,
            flags: Flags::UNMAPPED,
            data: Data::default(),
        }
    }

    /// Sets the read bases.
    #[must_use]
    pub fn sequence(mut self, bases: &str) -> Self {
        self.sequence = bases.as_bytes().to_vec();
        self
    }

    /// Sets raw (non-ASCII-offset) base qualities.
    #[must_use]
    pub fn qualities(mut self, quals: &[u8]) -> Self {
        self.qualities = Some(quals.to_vec());
        self
    }

    /// Sets the record flags.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a tag. Panics if `tag` is not exactly two bytes.
    #[must_use]
    pub fn tag<V: Into<Value>>(mut self, tag: &str, value: V) -> Self {
        let bytes = tag.as_bytes();
        assert_eq!(bytes.len(), 2, "tag must be two characters: {tag}");
        self.data.insert(Tag::new(bytes[0], bytes[1]), value.into());
        self
    }

    /// Builds the record.
    #[must_use]
    pub fn build(self) -> RecordBuf {
        let mut builder = RecordBuf::builder()
            .set_name(BString::from(self.name))
            .set_flags(self.flags)
            .set_sequence(Sequence::from(self.sequence))
            .set_data(self.data);
        if let Some(quals) = self.qualities {
            builder = builder.set_quality_scores(QualityScores::from(quals));
        }
        builder.build()
    }
}

/// Builds a read of `left` + `marker` + `right`, named with a polymerase range starting at
/// `origin_start` and spanning the whole read.
#[must_use]
pub fn subread_with_marker(
    run: &str,
    zmw: u32,
    origin_start: u64,
    left: &str,
    marker: &str,
    right: &str,
) -> SubreadBuilder {
    let sequence = format!("{left}{marker}{right}");
    let origin_end = origin_start + sequence.len() as u64;
    SubreadBuilder::new(&format!("{run}/{zmw}/{origin_start}_{origin_end}")).sequence(&sequence)
}
