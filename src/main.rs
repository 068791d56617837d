//! cmdset demo entry point.
//!
//! A small program built on the library, used to exercise dispatch from
//! the outside: usage text on stderr, command output on stdout, exit
//! status 2 for usage errors.

use std::process::ExitCode;
use std::time::Duration;

use cmdset::{Command, Registry};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `CMDSET_DEBUG=1` sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing() {
    let debug = std::env::var_os("CMDSET_DEBUG").is_some_and(|v| v == "1");
    let filter = if debug {
        EnvFilter::new("cmdset=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cmdset=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn version() -> Command {
    Command::new("version")
        .with_short_help("print the version and exit")
        .with_action(|_| {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        })
}

fn echo() -> Command {
    let mut cmd = Command::new("echo [-n] [--sep=<text>] <word>...")
        .with_short_help("print words to standard output");
    let no_newline = cmd.options_mut().bool("n", false, "do not print the trailing newline");
    let sep = cmd.options_mut().string("sep", " ", "text printed between words");
    cmd.with_long_help("Echo prints its arguments, separated by --sep.")
        .with_action(move |words| {
            let line = words.join(sep.get().as_str());
            if no_newline.get() {
                print!("{}", line);
            } else {
                println!("{}", line);
            }
            Ok(())
        })
}

fn repeat() -> Command {
    let mut cmd = Command::new("repeat [--times=<n>] [--every=<duration>] <word>")
        .with_short_help("print a word several times");
    let times = cmd.options_mut().uint("times", 2, "number of repetitions");
    let every = cmd
        .options_mut()
        .duration("every", Duration::ZERO, "pause between repetitions");
    cmd.with_action(move |args| {
        let [word] = args else {
            anyhow::bail!("repeat takes exactly one word, got {}", args.len());
        };
        for i in 0..times.get() {
            if i > 0 {
                std::thread::sleep(every.get());
            }
            println!("{}", word);
        }
        Ok(())
    })
}

fn flags_topic() -> Command {
    Command::new("flags")
        .with_short_help("how command flags are written")
        .with_long_help(
            "One-letter flags take a single dash (-n), longer ones two (--sep).\n\
             Values follow the flag or an equals sign: --sep=, or --sep ,\n\
             Boolean flags only take a value after an equals sign: -n=false.",
        )
}

fn main() -> ExitCode {
    init_tracing();

    let mut registry = Registry::new("", "cmdset demonstrates subcommand dispatch.");
    registry.register("version", version());
    registry.register("echo", echo());
    registry.register("repeat", repeat());
    registry.register("flags", flags_topic());

    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    let result = registry.run_args(args);
    if let Err(cmdset::DispatchError::Action(e)) = &result {
        eprintln!("Error: {:#}", e);
    }
    cmdset::exit_code(&result)
}
