//! The [`Command`] trait shared by all refarm subcommands.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// Trait implemented by all refarm CLI commands.
///
/// `command_line` is the full invocation, recorded in the output `@PG` header line.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
