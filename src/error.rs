//! Error types for command dispatch.
//!
//! This module defines [`DispatchError`], returned by every dispatch entry
//! point, [`ParseError`], returned by an [`OptionSet`](crate::options::OptionSet)
//! when it rejects an argument list, and a [`Result`] alias.
//!
//! # Error Handling Strategy
//!
//! - Usage errors (unknown command, help shown, bad options) have already
//!   been rendered to the diagnostic stream when they are returned; callers
//!   only map them to an exit status.
//! - Action failures are carried unmodified in [`DispatchError::Action`];
//!   reporting them is the embedding program's job.
//! - Programmer errors (empty command names, redefined flags) panic.

use thiserror::Error;

/// Exit status for every usage or invocation error.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Exit status suggested for a failed action.
pub const ACTION_EXIT_CODE: u8 = 1;

/// Outcome of a failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command name was given; the command listing was shown.
    #[error("no command given")]
    NoCommand,

    /// The name did not resolve to an invokable command.
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    /// Help text was shown, either through `help` or a help flag.
    #[error("help shown for {}", topic.as_deref().unwrap_or("all commands"))]
    HelpShown { topic: Option<String> },

    /// The command's option set rejected its arguments.
    #[error("{command}: {message}")]
    InvalidArguments { command: String, message: String },

    /// The command's action ran and reported a failure.
    #[error(transparent)]
    Action(anyhow::Error),
}

impl DispatchError {
    /// Whether this error is a usage error (already rendered, exit status 2).
    pub fn is_usage(&self) -> bool {
        !matches!(self, Self::Action(_))
    }

    /// Process exit status conventionally associated with this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            USAGE_EXIT_CODE
        } else {
            ACTION_EXIT_CODE
        }
    }

    /// Unwrap the action's own error, if this is an action failure.
    pub fn into_action_error(self) -> Option<anyhow::Error> {
        match self {
            Self::Action(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure reported by an option set while parsing arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A help flag (`-h`, `--help`) was seen.
    #[error("help requested")]
    HelpRequested,

    /// The arguments were malformed; the message is the parser's own.
    #[error("{0}")]
    Invalid(String),
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
