//! The process-wide default registry.
//!
//! Single-binary programs can register commands here instead of passing a
//! [`Registry`] around. Every function locks the shared registry and
//! delegates to the matching [`Registry`] method. The lock is released
//! before an action or a custom usage printer runs, so either may use
//! these functions itself.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::command::Command;
use crate::dispatch::{split_command, Refusal};
use crate::error::Result;
use crate::registry::Registry;

static DEFAULT: OnceLock<Mutex<Registry>> = OnceLock::new();

fn default_registry() -> MutexGuard<'static, Registry> {
    DEFAULT
        .get_or_init(|| Mutex::new(Registry::new("", "")))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Register a command with the default registry.
///
/// # Panics
///
/// Panics if `name` is empty.
pub fn register(name: impl Into<String>, command: Command) {
    default_registry().register(name, command);
}

/// Run `f` with mutable access to the default registry, for example to
/// set the program name.
///
/// `f` must not call the other functions of this module.
pub fn configure<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    f(&mut default_registry())
}

/// Print a command's usage, or the command listing, to standard error.
pub fn print_usage(name: &str) {
    let pending = default_registry().print_usage_deferred(name);
    if let Some(pending) = pending {
        pending.emit();
    }
}

/// Dispatch `name` with `args` against the default registry.
pub fn dispatch<I, S>(name: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let resolved = default_registry().resolve(name, args);
    resolved.map_err(Refusal::report)?.invoke()
}

/// Dispatch the process's own arguments: the first names the command,
/// the rest are its arguments. A missing name or a leading `-h`/`--help`
/// shows the command listing.
///
/// ```no_run
/// use std::process::ExitCode;
///
/// fn main() -> ExitCode {
///     cmdset::register(
///         "version",
///         cmdset::Command::new("version")
///             .with_short_help("print the version and exit")
///             .with_action(|_| {
///                 println!("1.0.0");
///                 Ok(())
///             }),
///     );
///     cmdset::exit_code(&cmdset::run())
/// }
/// ```
pub fn run() -> Result<()> {
    run_from(
        std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned()),
    )
}

/// Like [`run`], with an explicit argument list (without the program name).
pub fn run_from<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let (name, args) = split_command(args);
    dispatch(&name, args)
}
