//! `@PG` bookkeeping for the headers of split output.
//!
//! The split BAM keeps the input header and appends one program record, chained to the
//! last program already present so the provenance of the subreads stays readable.

use anyhow::Result;
use bstr::BString;
use noodles::sam::Header;
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::Program;
use noodles::sam::header::record::value::map::program::tag;
use std::collections::HashSet;

/// Program name and base `@PG` ID.
pub const PROGRAM_NAME: &str = "refarm";

/// The ID of the last program in the `@PG` chain, i.e. the one no other program names as PP.
#[must_use]
pub fn last_program_id(header: &Header) -> Option<String> {
    let programs = header.programs();
    let programs = programs.as_ref();

    let referenced: HashSet<&[u8]> = programs
        .values()
        .filter_map(|pg| pg.other_fields().get(&tag::PREVIOUS_PROGRAM_ID))
        .map(|pp| pp.as_ref())
        .collect();

    programs
        .keys()
        .find(|id| !referenced.contains(id.as_slice()))
        .or_else(|| programs.keys().next())
        .map(|id| String::from_utf8_lossy(id).into_owned())
}

/// `base_id` if unused, otherwise the first free `base_id.N`.
#[must_use]
pub fn unique_program_id(header: &Header, base_id: &str) -> String {
    let programs = header.programs();
    let programs = programs.as_ref();

    if !programs.contains_key(base_id.as_bytes()) {
        return base_id.to_string();
    }

    (1..)
        .map(|i| format!("{base_id}.{i}"))
        .find(|candidate| !programs.contains_key(candidate.as_bytes()))
        .unwrap_or_else(|| base_id.to_string())
}

/// Appends a `refarm` `@PG` record to `header`, chained to the previous last program.
///
/// # Example
/// ```
/// use noodles::sam::Header;
/// use refarm_lib::header::add_pg_record;
///
/// let header = add_pg_record(Header::default(), "0.1.0", "refarm split in.bam").unwrap();
/// assert!(header.programs().as_ref().contains_key(b"refarm".as_slice()));
/// ```
pub fn add_pg_record(mut header: Header, version: &str, command_line: &str) -> Result<Header> {
    let previous = last_program_id(&header);
    let id = unique_program_id(&header, PROGRAM_NAME);

    let mut builder = Map::<Program>::builder()
        .insert(tag::NAME, PROGRAM_NAME)
        .insert(tag::VERSION, version)
        .insert(tag::COMMAND_LINE, command_line);
    if let Some(pp) = previous {
        builder = builder.insert(tag::PREVIOUS_PROGRAM_ID, pp);
    }

    header.programs_mut().add(BString::from(id), builder.build()?)?;
    Ok(header)
}
