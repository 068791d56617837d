//! Flag storage and custom flag values.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared storage location for a parsed flag value.
///
/// A slot is handed out when a flag is defined and written when the
/// owning option set parses its arguments. Clones share the same value,
/// so a command's action can hold a clone and read the result after
/// parsing.
pub struct Slot<T>(Arc<Mutex<T>>);

impl<T> Slot<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Replace the stored value.
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    /// Run `f` with a reference to the stored value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with a mutable reference to the stored value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Slot<T> {
    /// Return a copy of the stored value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.lock()).finish()
    }
}

/// A flag value with its own parsing, for types the built-in flag
/// kinds don't cover.
///
/// `Display` renders the current value; it is captured as the flag's
/// default when the flag is defined.
pub trait Value: fmt::Display + Send + 'static {
    /// Parse `raw` and store it. Called once per occurrence of the flag.
    fn set(&mut self, raw: &str) -> Result<(), String>;

    /// Whether the value is text, so its default is shown quoted.
    fn is_textual(&self) -> bool {
        false
    }
}

/// A flag's default value as shown in usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDefault {
    text: String,
    quoted: bool,
}

impl FlagDefault {
    /// A default shown as-is, such as `false` or `10`.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// A textual default, shown in double quotes so `""` stays visible.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    /// The default value without quoting.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the default is rendered in quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }
}

impl fmt::Display for FlagDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "{:?}", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}
