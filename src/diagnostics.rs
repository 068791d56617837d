//! Diagnostic output sink.
//!
//! All usage, help and error text goes to a [`Diagnostics`] sink, which is
//! standard error unless a registry is configured to capture it.
//!
//! # Example
//!
//! ```
//! use cmdset::{Diagnostics, Registry};
//!
//! let diagnostics = Diagnostics::captured();
//! let registry = Registry::new("tool", "").with_diagnostics(diagnostics.clone());
//! registry.print_usage("");
//! assert!(diagnostics.contents().starts_with("usage: tool"));
//! ```

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Where rendered usage and error text is written.
#[derive(Debug, Clone, Default)]
pub enum Diagnostics {
    /// The process's standard error stream.
    #[default]
    Stderr,
    /// An in-memory buffer, shared between clones.
    Captured(Arc<Mutex<Vec<u8>>>),
}

impl Diagnostics {
    /// Create a sink that buffers everything written to it.
    pub fn captured() -> Self {
        Self::Captured(Arc::default())
    }

    /// Everything captured so far. Always empty for [`Diagnostics::Stderr`].
    pub fn contents(&self) -> String {
        match self {
            Self::Stderr => String::new(),
            Self::Captured(buf) => {
                let buf = buf.lock().unwrap_or_else(PoisonError::into_inner);
                String::from_utf8_lossy(&buf).into_owned()
            }
        }
    }

    /// Discard captured output.
    pub fn clear(&self) {
        if let Self::Captured(buf) = self {
            buf.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    /// Render with `f` and write the result in one piece.
    ///
    /// Write failures are ignored: there is nowhere left to report them.
    pub fn emit(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        let mut rendered = Vec::new();
        if f(&mut rendered).is_err() {
            return;
        }
        let _ = match self {
            Self::Stderr => io::stderr().lock().write_all(&rendered),
            Self::Captured(buf) => {
                buf.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&rendered);
                Ok(())
            }
        };
    }
}
