//! Per-command option sets.
//!
//! An [`OptionSet`] is a list of typed flag definitions. Parsing is
//! delegated to clap: the set builds a `clap::Command` from its flags,
//! lets clap tokenize and validate the arguments, then copies the parsed
//! values into the [`Slot`]s handed out at definition time.
//!
//! # Flag syntax
//!
//! - One-character names are short flags (`-v`), longer names are long
//!   flags (`--output`).
//! - Boolean flags take no separate value: `-v` sets `true`, `-v=false`
//!   sets `false`.
//! - Parsing stops at the first positional argument or at `--`; the
//!   remaining arguments are returned as-is.
//! - `-h` and `--help` request help unless the set defines a flag with
//!   that name itself.
//!
//! # Example
//!
//! ```
//! use cmdset::options::OptionSet;
//!
//! let mut options = OptionSet::new();
//! let verbose = options.bool("v", false, "print more");
//! let output = options.string("output", "", "write to this file");
//!
//! let rest = options.parse(["-v", "--output=out.txt", "a", "-b"]).unwrap();
//! assert!(verbose.get());
//! assert_eq!(output.get(), "out.txt");
//! assert_eq!(rest, vec!["a", "-b"]);
//! ```

pub mod duration;
mod value;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice};

use crate::error::ParseError;

pub use duration::{format_duration, parse_duration};
pub use value::{FlagDefault, Slot, Value};

/// Custom usage printer for an option set.
pub type UsageFn = Arc<dyn Fn(&mut dyn io::Write) -> io::Result<()> + Send + Sync>;

type Binder = Box<dyn Fn(&ArgMatches) -> Result<(), ParseError> + Send + Sync>;

const HELP_ID: &str = "cmdset.help";
const ARGS_ID: &str = "cmdset.args";

/// A single flag definition.
pub struct Flag {
    name: String,
    usage: String,
    default: FlagDefault,
    arg: Arg,
    bind: Binder,
}

impl Flag {
    /// The flag's name, without dashes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description of the flag.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The flag's default value.
    pub fn default_value(&self) -> &FlagDefault {
        &self.default
    }

    /// The flag as it is spelled on the command line, such as `-v` or
    /// `--output`.
    pub fn spelling(&self) -> String {
        format!("{}{}", dashes(&self.name), self.name)
    }

    /// The flag with its default, as shown in usage text: `-v=false`,
    /// `--output=""`.
    pub fn display(&self) -> String {
        format!("{}={}", self.spelling(), self.default)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// A command's set of flags.
#[derive(Default)]
pub struct OptionSet {
    flags: Vec<Flag>,
    usage: Option<UsageFn>,
}

impl OptionSet {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags in definition order.
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Flags sorted by name, the order used in usage text.
    pub fn sorted_flags(&self) -> Vec<&Flag> {
        let mut flags: Vec<&Flag> = self.flags.iter().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        flags
    }

    /// Find a flag by name.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Number of defined flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Check if no flags are defined.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Install a custom usage printer, used instead of the registry's
    /// rendering when help is requested or parsing fails.
    pub fn set_usage(
        &mut self,
        usage: impl Fn(&mut dyn io::Write) -> io::Result<()> + Send + Sync + 'static,
    ) {
        self.usage = Some(Arc::new(usage));
    }

    /// The custom usage printer, if one is installed.
    pub fn usage(&self) -> Option<&UsageFn> {
        self.usage.as_ref()
    }

    /// Parse `args` and store the flag values in their slots.
    ///
    /// Returns the positional arguments left after the flags.
    pub fn parse<I, S>(&self, args: I) -> Result<Vec<String>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let matches = self
            .to_command()
            .try_get_matches_from(args)
            .map_err(|e| ParseError::Invalid(first_line(&e.to_string())))?;

        if self.handles_help() && matches.get_flag(HELP_ID) {
            return Err(ParseError::HelpRequested);
        }

        for flag in &self.flags {
            (flag.bind)(&matches)?;
        }

        Ok(matches
            .get_many::<String>(ARGS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default())
    }

    /// Define a bool flag and return its storage.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Slot<bool> {
        let slot = Slot::new(default);
        self.bool_var(&slot, name, default, usage);
        slot
    }

    /// Define a bool flag stored in `slot`.
    pub fn bool_var(&mut self, slot: &Slot<bool>, name: &str, default: bool, usage: &str) {
        let arg = flag_arg(name)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(value_parser!(bool));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define an integer flag and return its storage.
    pub fn int(&mut self, name: &str, default: isize, usage: &str) -> Slot<isize> {
        let slot = Slot::new(default);
        self.int_var(&slot, name, default, usage);
        slot
    }

    /// Define an integer flag stored in `slot`.
    pub fn int_var(&mut self, slot: &Slot<isize>, name: &str, default: isize, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(isize));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define a 64-bit integer flag and return its storage.
    pub fn int64(&mut self, name: &str, default: i64, usage: &str) -> Slot<i64> {
        let slot = Slot::new(default);
        self.int64_var(&slot, name, default, usage);
        slot
    }

    /// Define a 64-bit integer flag stored in `slot`.
    pub fn int64_var(&mut self, slot: &Slot<i64>, name: &str, default: i64, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(i64));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define an unsigned integer flag and return its storage.
    pub fn uint(&mut self, name: &str, default: usize, usage: &str) -> Slot<usize> {
        let slot = Slot::new(default);
        self.uint_var(&slot, name, default, usage);
        slot
    }

    /// Define an unsigned integer flag stored in `slot`.
    pub fn uint_var(&mut self, slot: &Slot<usize>, name: &str, default: usize, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(usize));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define a 64-bit unsigned integer flag and return its storage.
    pub fn uint64(&mut self, name: &str, default: u64, usage: &str) -> Slot<u64> {
        let slot = Slot::new(default);
        self.uint64_var(&slot, name, default, usage);
        slot
    }

    /// Define a 64-bit unsigned integer flag stored in `slot`.
    pub fn uint64_var(&mut self, slot: &Slot<u64>, name: &str, default: u64, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(u64));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define a floating point flag and return its storage.
    pub fn float64(&mut self, name: &str, default: f64, usage: &str) -> Slot<f64> {
        let slot = Slot::new(default);
        self.float64_var(&slot, name, default, usage);
        slot
    }

    /// Define a floating point flag stored in `slot`.
    pub fn float64_var(&mut self, slot: &Slot<f64>, name: &str, default: f64, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(f64));
        self.define(slot, name, default, usage, FlagDefault::plain(default.to_string()), arg);
    }

    /// Define a string flag and return its storage.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Slot<String> {
        let slot = Slot::new(default.to_string());
        self.string_var(&slot, name, default, usage);
        slot
    }

    /// Define a string flag stored in `slot`.
    pub fn string_var(&mut self, slot: &Slot<String>, name: &str, default: &str, usage: &str) {
        let arg = value_arg(name).value_parser(value_parser!(String));
        self.define(slot, name, default.to_string(), usage, FlagDefault::quoted(default), arg);
    }

    /// Define a duration flag and return its storage.
    pub fn duration(&mut self, name: &str, default: Duration, usage: &str) -> Slot<Duration> {
        let slot = Slot::new(default);
        self.duration_var(&slot, name, default, usage);
        slot
    }

    /// Define a duration flag stored in `slot`.
    pub fn duration_var(
        &mut self,
        slot: &Slot<Duration>,
        name: &str,
        default: Duration,
        usage: &str,
    ) {
        let arg = value_arg(name).value_parser(parse_duration);
        self.define(slot, name, default, usage, FlagDefault::plain(format_duration(default)), arg);
    }

    /// Define a flag whose parsing is done by a [`Value`] implementation.
    ///
    /// The value's current rendering becomes the flag's default. Each
    /// occurrence of the flag calls [`Value::set`] in order.
    pub fn var<V: Value>(&mut self, value: &Slot<V>, name: &str, usage: &str) {
        let default = value.with(|v| {
            if v.is_textual() {
                FlagDefault::quoted(v.to_string())
            } else {
                FlagDefault::plain(v.to_string())
            }
        });
        let arg = value_arg(name)
            .action(ArgAction::Append)
            .value_parser(value_parser!(String));

        let target = value.clone();
        let id = name.to_string();
        let spelling = format!("{}{}", dashes(name), name);
        let bind: Binder = Box::new(move |matches: &ArgMatches| {
            for raw in matches.get_many::<String>(&id).into_iter().flatten() {
                target.with_mut(|v| v.set(raw)).map_err(|e| {
                    ParseError::Invalid(format!(
                        "error: invalid value '{}' for '{}': {}",
                        raw, spelling, e
                    ))
                })?;
            }
            Ok(())
        });

        self.insert(Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            default,
            arg,
            bind,
        });
    }

    fn define<T>(
        &mut self,
        slot: &Slot<T>,
        name: &str,
        default: T,
        usage: &str,
        rendered: FlagDefault,
        arg: Arg,
    ) where
        T: Clone + Send + Sync + 'static,
    {
        slot.set(default);

        let target = slot.clone();
        let id = name.to_string();
        let bind: Binder = Box::new(move |matches: &ArgMatches| {
            if let Some(value) = matches.get_one::<T>(&id) {
                target.set(value.clone());
            }
            Ok(())
        });

        self.insert(Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            default: rendered,
            arg,
            bind,
        });
    }

    fn insert(&mut self, flag: Flag) {
        assert!(!flag.name.is_empty(), "cmdset: flag defined with an empty name");
        assert!(
            !flag.name.starts_with('-') && !flag.name.contains('='),
            "cmdset: bad flag name {:?}",
            flag.name
        );
        assert!(
            self.lookup(&flag.name).is_none(),
            "cmdset: flag redefined: {}",
            flag.name
        );
        self.flags.push(flag);
    }

    fn handles_help(&self) -> bool {
        self.lookup("h").is_none() && self.lookup("help").is_none()
    }

    fn to_command(&self) -> clap::Command {
        let mut command = clap::Command::new("cmdset")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .color(ColorChoice::Never);

        for flag in &self.flags {
            command = command.arg(flag.arg.clone());
        }
        if self.handles_help() {
            command = command.arg(
                Arg::new(HELP_ID)
                    .short('h')
                    .long("help")
                    .action(ArgAction::SetTrue),
            );
        }

        command.arg(
            Arg::new(ARGS_ID)
                .num_args(1..)
                .trailing_var_arg(true)
                .value_parser(value_parser!(String)),
        )
    }
}

impl fmt::Debug for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSet")
            .field("flags", &self.flags)
            .field("custom_usage", &self.usage.is_some())
            .finish()
    }
}

fn dashes(name: &str) -> &'static str {
    if name.chars().count() > 1 {
        "--"
    } else {
        "-"
    }
}

/// A clap argument spelled the way usage text shows it.
fn flag_arg(name: &str) -> Arg {
    let arg = Arg::new(name.to_string());
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(short), None) => arg.short(short),
        _ => arg.long(name.to_string()),
    }
}

fn value_arg(name: &str) -> Arg {
    flag_arg(name)
        .num_args(1)
        .allow_hyphen_values(true)
        .value_name(name.to_uppercase())
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim_end().to_string()
}
