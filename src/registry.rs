//! Command registry.
//!
//! The [`Registry`] owns every registered [`Command`], keyed by name and
//! kept in name order. It also carries the program name and description
//! used in usage text, the [`Layout`] of that text, and the
//! [`Diagnostics`] sink it is written to.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::diagnostics::Diagnostics;
use crate::options::UsageFn;
use crate::usage::{self, Layout};

/// Registry of named commands.
#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<String, Command>,
    name: String,
    description: String,
    layout: Layout,
    diagnostics: Diagnostics,
}

impl Registry {
    /// Create an empty registry.
    ///
    /// `name` is the program name shown in usage text; when empty, the
    /// base name of the running executable is used instead.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Use a custom layout for usage text.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Write usage and error text to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
    }

    /// The configured program name, possibly empty. See [`Registry::program_name`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Register `command` under `name`.
    ///
    /// An existing command with the same name is replaced, with a warning
    /// on the diagnostic stream.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty; the empty name stands for "no command".
    pub fn register(&mut self, name: impl Into<String>, command: Command) {
        let name = name.into();
        assert!(!name.is_empty(), "cmdset: command registered with an empty name");

        debug!(command = %name, runnable = command.is_runnable(), "registering command");
        if self.commands.contains_key(&name) {
            self.diagnostics
                .emit(|w| writeln!(w, "warning: command {:?} already exists", name));
        }
        self.commands.insert(name, command);
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Check if a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All registered names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Registered names starting with `prefix`, in ascending order.
    ///
    /// An empty prefix matches every name.
    pub fn suggestions_for(&self, prefix: &str) -> Vec<&str> {
        self.commands
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Iterate over commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    /// Get the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The program name shown in usage text.
    ///
    /// This is the configured name, or the base name of the current
    /// executable when none is configured. It is resolved on every call.
    pub fn program_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        std::env::args_os()
            .next()
            .as_deref()
            .map(Path::new)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Print usage text to the diagnostic stream: the named command's
    /// usage if it is registered, the command listing otherwise.
    pub fn print_usage(&self, name: &str) {
        if let Some(pending) = self.print_usage_deferred(name) {
            pending.emit();
        }
    }

    /// Like [`print_usage`](Self::print_usage), but a custom usage printer
    /// is handed back instead of run.
    pub(crate) fn print_usage_deferred(&self, name: &str) -> Option<PendingUsage> {
        match self.commands.get(name) {
            Some(command) => self.print_command_usage(command),
            None => {
                self.diagnostics.emit(|w| self.write_listing(w));
                None
            }
        }
    }

    /// The command listing as a string.
    pub fn listing(&self) -> String {
        let mut out = Vec::new();
        let _ = self.write_listing(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// A command's usage text as a string, ignoring any custom usage
    /// printer. `None` if no such command is registered.
    pub fn command_usage(&self, name: &str) -> Option<String> {
        let command = self.commands.get(name)?;
        let mut out = Vec::new();
        let _ = usage::write_command(&mut out, &self.program_name(), &self.layout, command);
        Some(String::from_utf8_lossy(&out).into_owned())
    }

    /// Render a command's usage. A custom printer may call back into the
    /// registry, so it is returned unrun.
    pub(crate) fn print_command_usage(&self, command: &Command) -> Option<PendingUsage> {
        match command.options().usage() {
            Some(custom) => Some(PendingUsage {
                printer: Arc::clone(custom),
                diagnostics: self.diagnostics.clone(),
            }),
            None => {
                self.diagnostics.emit(|w| {
                    usage::write_command(w, &self.program_name(), &self.layout, command)
                });
                None
            }
        }
    }

    pub(crate) fn print_unknown_command(&self, name: &str) {
        let suggestions = self.suggestions_for(name);
        self.diagnostics
            .emit(|w| usage::write_unknown_command(w, name, &suggestions));
    }

    fn write_listing(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let commands: Vec<(&str, &str)> = self
            .commands
            .iter()
            .map(|(name, cmd)| (name.as_str(), cmd.short_help()))
            .collect();
        usage::write_listing(
            w,
            &self.program_name(),
            &self.description,
            &self.layout,
            &commands,
        )
    }
}

/// A custom usage printer detached from its registry.
pub(crate) struct PendingUsage {
    printer: UsageFn,
    diagnostics: Diagnostics,
}

impl PendingUsage {
    /// Run the printer into the registry's diagnostic sink.
    pub(crate) fn emit(self) {
        self.diagnostics.emit(|w| (self.printer)(w));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new("tool", "").with_diagnostics(Diagnostics::captured())
    }

    #[test]
    fn registry_starts_empty() {
        let registry = registry();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn names_are_sorted_regardless_of_registration_order() {
        let mut registry = registry();
        for name in ["zeta", "alpha", "Beta", "mid"] {
            registry.register(name, Command::new(name));
        }
        assert_eq!(registry.names(), vec!["Beta", "alpha", "mid", "zeta"]);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let mut registry = registry();
        registry.register("export", Command::new("export"));
        assert!(registry.get("export").is_some());
        assert!(registry.get("Export").is_none());
        assert!(registry.get("exp").is_none());
        assert!(registry.contains("export"));
    }

    #[test]
    fn suggestions_are_prefix_matches() {
        let mut registry = registry();
        for name in ["export", "exec", "list", "ex"] {
            registry.register(name, Command::new(name));
        }
        assert_eq!(registry.suggestions_for("ex"), vec!["ex", "exec", "export"]);
        assert_eq!(registry.suggestions_for("exp"), vec!["export"]);
        assert!(registry.suggestions_for("zz").is_empty());
        assert_eq!(registry.suggestions_for("").len(), 4);
    }

    #[test]
    fn reregistering_replaces_and_warns() {
        let mut registry = registry();
        registry.register("run", Command::new("run").with_short_help("old"));
        assert!(registry.diagnostics().contents().is_empty());

        registry.register("run", Command::new("run").with_short_help("new"));
        assert_eq!(registry.get("run").unwrap().short_help(), "new");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.diagnostics().contents(),
            "warning: command \"run\" already exists\n"
        );
    }

    #[test]
    #[should_panic(expected = "empty name")]
    fn empty_name_panics() {
        registry().register("", Command::new(""));
    }

    #[test]
    fn program_name_prefers_configured_name() {
        assert_eq!(registry().program_name(), "tool");
    }

    #[test]
    fn program_name_falls_back_to_executable() {
        let registry = Registry::new("", "");
        let name = registry.program_name();
        assert!(!name.is_empty());
        assert!(!name.contains('/'));
    }

    #[test]
    fn print_usage_renders_listing_for_unknown_names() {
        let mut registry = registry();
        registry.register(
            "version",
            Command::new("version").with_short_help("print the version and exit"),
        );

        registry.print_usage("");
        let listing = registry.diagnostics().contents();
        assert_eq!(listing, registry.listing());
        assert!(listing.contains("    version   print the version and exit\n"));

        registry.diagnostics().clear();
        registry.print_usage("nope");
        assert_eq!(registry.diagnostics().contents(), listing);
    }

    #[test]
    fn print_usage_renders_command_usage() {
        let mut registry = registry();
        registry.register("version", Command::new("version"));

        registry.print_usage("version");
        assert_eq!(
            registry.diagnostics().contents(),
            "usage: tool version\n\nArguments:\n"
        );
    }

    #[test]
    fn custom_usage_replaces_rendering() {
        let mut registry = registry();
        registry.register(
            "x",
            Command::new("x").with_usage(|w| writeln!(w, "custom usage")),
        );

        registry.print_usage("x");
        assert_eq!(registry.diagnostics().contents(), "custom usage\n");
        assert!(registry.command_usage("x").unwrap().starts_with("usage: tool x"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut registry = registry();
        let mut export = Command::new("export").with_short_help("export things");
        export.options_mut().bool("v", false, "verbose");
        registry.register("export", export);

        assert_eq!(registry.listing(), registry.listing());
        assert_eq!(registry.command_usage("export"), registry.command_usage("export"));
        assert!(registry.command_usage("missing").is_none());
    }

    #[test]
    fn iter_visits_in_name_order() {
        let mut registry = registry();
        registry.register("b", Command::new("b"));
        registry.register("a", Command::new("a"));
        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
