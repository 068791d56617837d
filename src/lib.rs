//! cmdset - subcommand dispatch for command-line programs.
//!
//! A program registers named [`Command`]s, each with its own
//! [`OptionSet`](options::OptionSet), and hands its arguments to a
//! [`Registry`]. The registry routes the first argument to the matching
//! command, parses the rest with that command's options and runs the
//! command's action, or renders usage text when the name is missing,
//! unknown, or `help`.
//!
//! # Modules
//!
//! - [`command`] - Commands and their actions
//! - [`diagnostics`] - Where usage and error text is written
//! - [`dispatch`] - Routing a command name to its action
//! - [`error`] - Error types and result aliases
//! - [`global`] - The process-wide default registry
//! - [`options`] - Per-command option sets (backed by clap)
//! - [`registry`] - The command registry
//! - [`usage`] - Usage text rendering
//!
//! # Example
//!
//! ```
//! use cmdset::{Command, Diagnostics, DispatchError, Registry};
//!
//! let diagnostics = Diagnostics::captured();
//! let mut registry = Registry::new("example", "").with_diagnostics(diagnostics.clone());
//! registry.register(
//!     "version",
//!     Command::new("version")
//!         .with_short_help("print the version and exit")
//!         .with_action(|_| Ok(())),
//! );
//!
//! registry.run("version", Vec::<String>::new()).unwrap();
//!
//! let err = registry.run("", Vec::<String>::new()).unwrap_err();
//! assert!(matches!(err, DispatchError::NoCommand));
//! assert_eq!(err.exit_code(), 2);
//! assert!(diagnostics.contents().contains("    version   print the version and exit\n"));
//! ```

pub mod command;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod options;
pub mod registry;
pub mod usage;

pub use command::{Action, Command};
pub use diagnostics::Diagnostics;
pub use dispatch::{exit_code, Invocation, HELP_COMMAND};
pub use error::{DispatchError, ParseError, Result, USAGE_EXIT_CODE};
pub use global::{configure, dispatch as dispatch_default, print_usage, register, run, run_from};
pub use options::{OptionSet, Slot, Value};
pub use registry::Registry;
pub use usage::Layout;
