//! jabi: derives ABI stub records from Java sources.
//!
//! `jabi stubs` parses a batch of `.java` files, resolves every declared type
//! against the batch and the configured symbol tables, and writes one stub
//! record per top-level type. `jabi lookup` prints a single type's surface.

#![warn(missing_docs)]

mod logging;
mod lookup;
mod pipeline;
mod stubs;

use std::io::IsTerminal;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// jabi: Java ABI stub generator.
#[derive(Parser, Debug)]
#[command(name = "jabi", version, about = "Java ABI stub generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `jabi.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log line encoding; overrides `[log] format`.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate stub records for every type in the batch.
    Stubs(StubsArgs),
    /// Print the surface of one type.
    Lookup(LookupArgs),
}

/// Where sources and dependency symbols come from.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// `.java` files or directories. Defaults to `[project] sources`.
    pub paths: Vec<String>,

    /// JSON symbol tables for compiled dependencies (repeatable).
    #[arg(long = "symbols", value_name = "FILE")]
    pub symbols: Vec<String>,

    /// Do not consult the built-in `java.lang` symbols.
    #[arg(long)]
    pub no_platform: bool,
}

/// Arguments for `jabi stubs`.
#[derive(Args, Debug)]
pub struct StubsArgs {
    /// Sources and symbol tables.
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Directory to write one stub file per top-level type into.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Stub encoding; overrides `[output] format`.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Arguments for `jabi lookup`.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Canonical name of the type, e.g. `com.example.Foo.Bar`.
    pub name: String,

    /// Sources and symbol tables.
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Stub encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Indented human-readable summary.
    Text,
}

/// Log line encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Compact text lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to log at debug level.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Log encoding requested on the command line.
    pub log_format: Option<LogFormatArg>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        log_format: cli.log_format,
    };

    let result = match cli.command {
        Command::Stubs(ref args) => stubs::run(args, &global),
        Command::Lookup(ref args) => lookup::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stubs_default() {
        let cli = Cli::parse_from(["jabi", "stubs"]);
        match cli.command {
            Command::Stubs(ref args) => {
                assert!(args.inputs.paths.is_empty());
                assert!(args.inputs.symbols.is_empty());
                assert!(!args.inputs.no_platform);
                assert!(args.out.is_none());
                assert!(args.format.is_none());
            }
            _ => panic!("expected Stubs command"),
        }
    }

    #[test]
    fn parse_stubs_with_args() {
        let cli = Cli::parse_from([
            "jabi",
            "stubs",
            "src/main/java",
            "Extra.java",
            "--symbols",
            "deps/guava.json",
            "--symbols",
            "deps/jsr305.json",
            "--out",
            "build/abi",
            "--format",
            "text",
        ]);
        match cli.command {
            Command::Stubs(ref args) => {
                assert_eq!(args.inputs.paths, vec!["src/main/java", "Extra.java"]);
                assert_eq!(
                    args.inputs.symbols,
                    vec!["deps/guava.json", "deps/jsr305.json"]
                );
                assert_eq!(args.out.as_deref(), Some("build/abi"));
                assert_eq!(args.format, Some(OutputFormat::Text));
            }
            _ => panic!("expected Stubs command"),
        }
    }

    #[test]
    fn parse_lookup() {
        let cli = Cli::parse_from(["jabi", "lookup", "com.example.Foo", "src", "--no-platform"]);
        match cli.command {
            Command::Lookup(ref args) => {
                assert_eq!(args.name, "com.example.Foo");
                assert_eq!(args.inputs.paths, vec!["src"]);
                assert!(args.inputs.no_platform);
            }
            _ => panic!("expected Lookup command"),
        }
    }

    #[test]
    fn lookup_requires_a_name() {
        assert!(Cli::try_parse_from(["jabi", "lookup"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "jabi",
            "--quiet",
            "--color",
            "never",
            "--log-format",
            "json",
            "stubs",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["jabi", "stubs", "--verbose", "--config", "/p/jabi.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/p/jabi.toml"));
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["jabi", "stubs", "--format", "xml"]).is_err());
    }
}
