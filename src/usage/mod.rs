//! Usage text rendering.
//!
//! Two forms are rendered, both meant for the diagnostic stream:
//!
//! - the command listing, shown when no command is named or for `help`;
//! - a single command's usage, with its options in aligned columns.
//!
//! # Listing
//!
//! ```text
//! usage: prog <command> [arguments]
//!
//! Available commands:
//!     export    export domains to a file
//!     version   print the version and exit
//!
//! Use 'prog help <command>' for more information on a specific command.
//!
//! ```

pub mod columns;

use std::io::{self, Write};

use crate::command::Command;

pub use columns::{columnize, display_width};

/// Indentation and spacing of rendered usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Left margin of the command listing rows.
    pub command_indent: usize,
    /// Left margin of the option rows in a command's usage.
    pub option_indent: usize,
    /// Spaces between the two columns.
    pub column_gap: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            command_indent: 4,
            option_indent: 3,
            column_gap: 3,
        }
    }
}

/// Write the command listing.
///
/// `commands` pairs each command name with its short help and should be
/// sorted by name.
pub fn write_listing(
    w: &mut dyn Write,
    program: &str,
    description: &str,
    layout: &Layout,
    commands: &[(&str, &str)],
) -> io::Result<()> {
    writeln!(w, "usage: {} <command> [arguments]", program)?;
    writeln!(w)?;

    if commands.is_empty() {
        return Ok(());
    }

    if !description.is_empty() {
        writeln!(w, "{}", description)?;
        writeln!(w)?;
    }
    writeln!(w, "Available commands:")?;
    w.write_all(columnize(commands, layout.command_indent, layout.column_gap).as_bytes())?;
    writeln!(w)?;
    writeln!(
        w,
        "Use '{} help <command>' for more information on a specific command.",
        program
    )?;
    writeln!(w)
}

/// Write one command's usage: its synopsis, options and long help.
pub fn write_command(
    w: &mut dyn Write,
    program: &str,
    layout: &Layout,
    command: &Command,
) -> io::Result<()> {
    writeln!(w, "usage: {} {}", program, command.usage_line())?;
    writeln!(w)?;
    writeln!(w, "Arguments:")?;

    let rows: Vec<(String, &str)> = command
        .options()
        .sorted_flags()
        .into_iter()
        .map(|flag| (flag.display(), flag.usage()))
        .collect();
    w.write_all(columnize(&rows, layout.option_indent, layout.column_gap).as_bytes())?;

    if !command.long_help().is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", command.long_help())?;
    }
    Ok(())
}

/// Write the unknown-command message with any prefix-matching names.
pub fn write_unknown_command(
    w: &mut dyn Write,
    name: &str,
    suggestions: &[&str],
) -> io::Result<()> {
    writeln!(w, "unknown command: {}", name)?;
    if !suggestions.is_empty() {
        writeln!(w)?;
        writeln!(w, "Did you mean one of these?")?;
        for suggestion in suggestions {
            writeln!(w, "\t{}", suggestion)?;
        }
    }
    Ok(())
}
