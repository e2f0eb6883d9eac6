//! Tagged console lines.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use trellis_engine::Table;

pub(crate) fn ok(out: &mut dyn Write, message: impl Display) -> io::Result<()> {
    writeln!(out, "{} {message}", "[OK]".green().bold())
}

pub(crate) fn error(out: &mut dyn Write, message: impl Display) -> io::Result<()> {
    writeln!(out, "{} {message}", "[ERROR]".red().bold())
}

pub(crate) fn warning(out: &mut dyn Write, message: impl Display) -> io::Result<()> {
    writeln!(out, "{} {message}", "[WARNING]".yellow().bold())
}

pub(crate) fn time_spent(out: &mut dyn Write, elapsed: Duration) -> io::Result<()> {
    ok(out, format_args!("Time spent: {elapsed:?}"))
}

/// Prints `table` if it binds anything; tables with no columns print nothing.
pub(crate) fn table(out: &mut dyn Write, table: &Table) -> io::Result<()> {
    if table.bindings().is_empty() {
        return Ok(());
    }
    writeln!(out, "{table}")
}
