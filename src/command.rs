//! Commands.
//!
//! A [`Command`] bundles an optional action with its help text and its own
//! [`OptionSet`]. A command without an action is a help-only topic: it is
//! listed and its help can be shown, but it cannot be invoked.
//!
//! # Example
//!
//! ```
//! use cmdset::Command;
//!
//! let mut export = Command::new("export [-v] [--output=<file>] <domain>...")
//!     .with_short_help("export domains to a file");
//! let verbose = export.options_mut().bool("v", false, "print each domain");
//! let export = export.with_action(move |domains| {
//!     if verbose.get() {
//!         for domain in domains {
//!             eprintln!("exporting {}", domain);
//!         }
//!     }
//!     Ok(())
//! });
//!
//! assert!(export.is_runnable());
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::options::OptionSet;

/// The runnable part of a command.
///
/// Receives the positional arguments left after the command's options.
pub type Action = Arc<dyn Fn(&[String]) -> anyhow::Result<()> + Send + Sync>;

/// A registrable command or help topic.
pub struct Command {
    action: Option<Action>,
    usage_line: String,
    short_help: String,
    long_help: String,
    options: OptionSet,
}

impl Command {
    /// Create a help-only command with the given usage synopsis, such as
    /// `"export [-v] <domain>..."`. The synopsis follows the program name
    /// in usage text.
    pub fn new(usage_line: impl Into<String>) -> Self {
        Self {
            action: None,
            usage_line: usage_line.into(),
            short_help: String::new(),
            long_help: String::new(),
            options: OptionSet::new(),
        }
    }

    /// Set the action, making the command invokable.
    pub fn with_action(
        mut self,
        action: impl Fn(&[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Set the one-line description shown in the command listing.
    pub fn with_short_help(mut self, short_help: impl Into<String>) -> Self {
        self.short_help = short_help.into();
        self
    }

    /// Set the free-form help appended to the command's usage text.
    pub fn with_long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help = long_help.into();
        self
    }

    /// Replace the command's usage text with a custom printer.
    pub fn with_usage(
        mut self,
        usage: impl Fn(&mut dyn io::Write) -> io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.options.set_usage(usage);
        self
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// Whether the command has an action.
    pub fn is_runnable(&self) -> bool {
        self.action.is_some()
    }

    pub fn usage_line(&self) -> &str {
        &self.usage_line
    }

    pub fn short_help(&self) -> &str {
        &self.short_help
    }

    pub fn long_help(&self) -> &str {
        &self.long_help
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Mutable access to the option set, for defining flags.
    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("runnable", &self.is_runnable())
            .field("usage_line", &self.usage_line)
            .field("short_help", &self.short_help)
            .field("long_help", &self.long_help)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_command_is_a_topic() {
        let cmd = Command::new("topics");
        assert!(!cmd.is_runnable());
        assert!(cmd.action().is_none());
        assert_eq!(cmd.usage_line(), "topics");
        assert!(cmd.short_help().is_empty());
        assert!(cmd.long_help().is_empty());
        assert!(cmd.options().is_empty());
    }

    #[test]
    fn builder_sets_help_text() {
        let cmd = Command::new("version")
            .with_short_help("print the version and exit")
            .with_long_help("Prints the version.\nThen exits.");
        assert_eq!(cmd.short_help(), "print the version and exit");
        assert_eq!(cmd.long_help(), "Prints the version.\nThen exits.");
    }

    #[test]
    fn action_receives_arguments() {
        let cmd = Command::new("echo <word>...").with_action(|args| {
            anyhow::ensure!(args == ["a", "b"], "unexpected args {:?}", args);
            Ok(())
        });
        assert!(cmd.is_runnable());

        let action = cmd.action().unwrap();
        assert!(action(&["a".to_string(), "b".to_string()]).is_ok());
        assert!(action(&[]).is_err());
    }

    #[test]
    fn options_are_owned_by_the_command() {
        let mut cmd = Command::new("export");
        cmd.options_mut().bool("v", false, "verbose");
        assert!(cmd.options().lookup("v").is_some());
    }

    #[test]
    fn with_usage_installs_custom_printer() {
        let cmd = Command::new("x").with_usage(|w| write!(w, "custom"));
        assert!(cmd.options().usage().is_some());
    }
}
