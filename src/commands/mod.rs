//! CLI command implementations for refarm.
//!
//! - [`split`] - Split subreads at internal marker matches
//! - [`removed`] - Recover the sequence removed by `split`

pub mod command;
pub mod common;
pub mod removed;
pub mod split;
