//! Command dispatching.
//!
//! Dispatch resolves a command name against a [`Registry`], parses the
//! command's options and runs its action. Every usage problem is rendered
//! to the registry's diagnostic stream and reported as a
//! [`DispatchError`] whose [`exit_code`](DispatchError::exit_code) is 2;
//! the program's entry point turns the result into a process exit status
//! with [`exit_code`].
//!
//! # Routing
//!
//! - `""`: the command listing.
//! - a registered name: parse its options, then run its action.
//! - `help`: the listing, or `help <name>` for one command's usage.
//!   A registered `help` command takes precedence.
//! - anything else: `unknown command: <name>` with prefix matches.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::debug;

use crate::command::Action;
use crate::error::{DispatchError, ParseError, Result};
use crate::registry::{PendingUsage, Registry};

/// Name of the built-in help pseudo-command.
pub const HELP_COMMAND: &str = "help";

/// A resolved command ready to run.
///
/// Holding an invocation does not borrow the registry, so the registry
/// can be released before the action runs.
pub struct Invocation {
    command: String,
    action: Action,
    args: Vec<String>,
}

impl Invocation {
    /// Name of the command being invoked.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Positional arguments left after the command's options.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the action. Its error is returned unmodified as
    /// [`DispatchError::Action`].
    pub fn invoke(self) -> Result<()> {
        debug!(command = %self.command, args = ?self.args, "invoking command");
        (self.action)(&self.args).map_err(DispatchError::Action)
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("command", &self.command)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Dispatch `name` with its trailing `args` and run the action.
    pub fn run<I, S>(&self, name: &str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prepare(name, args)?.invoke()
    }

    /// Dispatch a full argument list (without the program name): the
    /// first argument names the command.
    pub fn run_args<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (name, args) = split_command(args);
        self.run(&name, args)
    }

    /// Resolve `name` and parse its options without running the action.
    ///
    /// All usage and error text is rendered here.
    pub fn prepare<I, S>(&self, name: &str, args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve(name, args).map_err(Refusal::report)
    }

    /// Like [`prepare`](Self::prepare), except that a custom usage printer
    /// is left in the [`Refusal`] for the caller to run once the registry
    /// is no longer borrowed.
    pub(crate) fn resolve<I, S>(
        &self,
        name: &str,
        args: I,
    ) -> std::result::Result<Invocation, Refusal>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        debug!(command = %name, args = ?args, "dispatching");

        if name.is_empty() {
            self.print_usage("");
            return Err(DispatchError::NoCommand.into());
        }

        let Some(command) = self.get(name) else {
            if name == HELP_COMMAND {
                return Err(self.help(&args));
            }
            return Err(self.unknown_command(name).into());
        };

        let args = match command.options().parse(args) {
            Ok(args) => args,
            Err(ParseError::HelpRequested) => {
                return Err(Refusal {
                    usage: self.print_command_usage(command),
                    error: DispatchError::HelpShown {
                        topic: Some(name.to_string()),
                    },
                });
            }
            Err(ParseError::Invalid(message)) => {
                self.diagnostics().emit(|w| writeln!(w, "{}", message));
                return Err(Refusal {
                    usage: self.print_command_usage(command),
                    error: DispatchError::InvalidArguments {
                        command: name.to_string(),
                        message,
                    },
                });
            }
        };

        let Some(action) = command.action() else {
            debug!(command = %name, "help-only command cannot be invoked");
            return Err(self.unknown_command(name).into());
        };

        Ok(Invocation {
            command: name.to_string(),
            action: Arc::clone(action),
            args,
        })
    }

    fn help(&self, args: &[String]) -> Refusal {
        match args {
            [topic] if !topic.is_empty() => match self.get(topic) {
                Some(command) => Refusal {
                    usage: self.print_command_usage(command),
                    error: DispatchError::HelpShown {
                        topic: Some(topic.clone()),
                    },
                },
                None => self.unknown_command(topic).into(),
            },
            _ => {
                self.print_usage("");
                DispatchError::HelpShown { topic: None }.into()
            }
        }
    }

    fn unknown_command(&self, name: &str) -> DispatchError {
        self.print_unknown_command(name);
        DispatchError::UnknownCommand {
            name: name.to_string(),
        }
    }
}

/// A dispatch that stopped before the action, with any usage output still
/// to be written.
pub(crate) struct Refusal {
    error: DispatchError,
    usage: Option<PendingUsage>,
}

impl Refusal {
    /// Write the pending usage output and return the error.
    pub(crate) fn report(self) -> DispatchError {
        if let Some(usage) = self.usage {
            usage.emit();
        }
        self.error
    }
}

impl From<DispatchError> for Refusal {
    fn from(error: DispatchError) -> Self {
        Self { error, usage: None }
    }
}

/// Split an argument list into the command name and its arguments.
///
/// A missing name or a leading help flag yields the empty name.
pub(crate) fn split_command<I, S>(args: I) -> (String, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let name = match args.next() {
        Some(name) if !matches!(name.as_str(), "-h" | "--help") => name,
        _ => String::new(),
    };
    (name, args.collect())
}

/// Map a dispatch result to a process exit status: success, 2 for usage
/// errors, 1 for a failed action.
pub fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{Command, Diagnostics};

    fn registry() -> Registry {
        let mut registry = Registry::new("tool", "").with_diagnostics(Diagnostics::captured());
        registry.register(
            "version",
            Command::new("version")
                .with_short_help("print the version and exit")
                .with_action(|_| Ok(())),
        );
        registry.register(
            "fail",
            Command::new("fail").with_action(|_| anyhow::bail!("it broke")),
        );
        registry.register(
            "topics",
            Command::new("topics").with_short_help("help topics"),
        );
        registry
    }

    fn output(registry: &Registry) -> String {
        registry.diagnostics().contents()
    }

    #[test]
    fn runs_action_with_positional_args() {
        let mut registry = registry();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let mut echo = Command::new("echo [-n] <word>...");
        let newline = echo.options_mut().bool("n", false, "omit newline");
        let echo = echo.with_action(move |args| {
            anyhow::ensure!(args == ["a", "b"], "got {:?}", args);
            anyhow::ensure!(newline.get(), "flag not set");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        registry.register("echo", echo);

        registry.run("echo", ["-n", "a", "b"]).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(output(&registry).is_empty());
    }

    #[test]
    fn action_error_is_propagated_unmodified() {
        let registry = registry();
        let err = registry.run("fail", Vec::<String>::new()).unwrap_err();
        assert!(!err.is_usage());
        assert_eq!(err.to_string(), "it broke");
        assert!(output(&registry).is_empty());
    }

    #[test]
    fn empty_name_renders_listing() {
        let registry = registry();
        let err = registry.run("", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DispatchError::NoCommand));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(output(&registry), registry.listing());
    }

    #[test]
    fn unknown_command_without_suggestions() {
        let registry = registry();
        let err = registry.run("zap", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand { ref name } if name == "zap"));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(output(&registry), "unknown command: zap\n");
    }

    #[test]
    fn unknown_command_suggests_prefix_matches() {
        let registry = registry();
        registry.run("t", Vec::<String>::new()).unwrap_err();
        assert_eq!(
            output(&registry),
            "unknown command: t\n\nDid you mean one of these?\n\ttopics\n"
        );
    }

    #[test]
    fn help_without_args_renders_listing() {
        let registry = registry();
        let err = registry.run("help", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DispatchError::HelpShown { topic: None }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(output(&registry), registry.listing());
    }

    #[test]
    fn help_with_two_args_renders_listing() {
        let registry = registry();
        registry.run("help", ["version", "fail"]).unwrap_err();
        assert_eq!(output(&registry), registry.listing());
    }

    #[test]
    fn help_with_empty_topic_renders_listing() {
        let registry = registry();
        let err = registry.run("help", [""]).unwrap_err();
        assert!(matches!(err, DispatchError::HelpShown { topic: None }));
        assert_eq!(output(&registry), registry.listing());
    }

    #[test]
    fn help_with_command_renders_its_usage() {
        let registry = registry();
        let err = registry.run("help", ["version"]).unwrap_err();
        assert!(matches!(err, DispatchError::HelpShown { topic: Some(ref t) } if t == "version"));
        assert_eq!(output(&registry), "usage: tool version\n\nArguments:\n");
    }

    #[test]
    fn help_renders_help_only_topics() {
        let registry = registry();
        registry.run("help", ["topics"]).unwrap_err();
        assert!(output(&registry).starts_with("usage: tool topics\n"));
    }

    #[test]
    fn help_with_unknown_command_uses_unknown_framing() {
        let registry = registry();
        let err = registry.run("help", ["ver"]).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand { ref name } if name == "ver"));
        assert_eq!(
            output(&registry),
            "unknown command: ver\n\nDid you mean one of these?\n\tversion\n"
        );
    }

    #[test]
    fn registered_help_command_takes_precedence() {
        let mut registry = registry();
        let called = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&called);
        registry.register(
            "help",
            Command::new("help").with_action(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        registry.run("help", Vec::<String>::new()).unwrap();
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn help_flag_renders_command_usage() {
        let registry = registry();
        let err = registry.run("version", ["-h"]).unwrap_err();
        assert!(matches!(err, DispatchError::HelpShown { topic: Some(_) }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(output(&registry), "usage: tool version\n\nArguments:\n");
    }

    #[test]
    fn help_flag_uses_custom_usage() {
        let mut registry = registry();
        registry.register(
            "custom",
            Command::new("custom")
                .with_action(|_| Ok(()))
                .with_usage(|w| writeln!(w, "custom usage")),
        );

        registry.run("custom", ["--help"]).unwrap_err();
        assert_eq!(output(&registry), "custom usage\n");
    }

    #[test]
    fn parse_failure_prints_error_before_custom_usage() {
        let mut registry = registry();
        registry.register(
            "custom",
            Command::new("custom")
                .with_action(|_| Ok(()))
                .with_usage(|w| writeln!(w, "custom usage")),
        );

        registry.run("custom", ["--bogus"]).unwrap_err();
        let out = output(&registry);
        let (first, rest) = out.split_once('\n').unwrap();
        assert!(first.contains("--bogus"));
        assert_eq!(rest, "custom usage\n");
    }

    #[test]
    fn parse_failure_prints_error_then_usage() {
        let registry = registry();
        let err = registry.run("version", ["--bogus"]).unwrap_err();
        match &err {
            DispatchError::InvalidArguments { command, message } => {
                assert_eq!(command, "version");
                assert!(message.contains("--bogus"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.exit_code(), 2);

        let out = output(&registry);
        let (first, rest) = out.split_once('\n').unwrap();
        assert!(first.contains("--bogus"));
        assert_eq!(rest, "usage: tool version\n\nArguments:\n");
    }

    #[test]
    fn help_only_topic_cannot_be_invoked() {
        let registry = registry();
        let err = registry.run("topics", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand { ref name } if name == "topics"));
        assert!(output(&registry).starts_with("unknown command: topics\n"));
    }

    #[test]
    fn prepare_does_not_run_the_action() {
        let mut registry = registry();
        let called = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&called);
        registry.register(
            "count",
            Command::new("count").with_action(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        let invocation = registry.prepare("count", ["x"]).unwrap();
        assert_eq!(invocation.command(), "count");
        assert_eq!(invocation.args(), ["x"]);
        assert_eq!(called.load(Ordering::SeqCst), 0);

        invocation.invoke().unwrap();
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_args_splits_command_name() {
        let registry = registry();
        registry.run_args(["version"]).unwrap();

        let err = registry.run_args(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DispatchError::NoCommand));
    }

    #[test]
    fn split_command_treats_help_flags_as_no_command() {
        assert_eq!(split_command(["--help", "x"]), (String::new(), vec!["x".to_string()]));
        assert_eq!(split_command(["-h"]).0, "");
        assert_eq!(
            split_command(["run", "-v"]),
            ("run".to_string(), vec!["-v".to_string()])
        );
        assert_eq!(split_command(["-help"]).0, "-help");
    }

    #[test]
    fn exit_code_maps_results() {
        let code = |result: Result<()>| format!("{:?}", exit_code(&result));
        assert_eq!(code(Ok(())), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(code(Err(DispatchError::NoCommand)), format!("{:?}", ExitCode::from(2)));
        assert_eq!(
            code(Err(DispatchError::Action(anyhow::anyhow!("x")))),
            format!("{:?}", ExitCode::from(1))
        );
    }
}
