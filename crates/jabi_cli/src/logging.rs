//! Subscriber setup for the `tracing` events the library crates emit.

use std::sync::OnceLock;

use jabi_config::{LogFormat, LogLevel, LogSection};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{GlobalArgs, LogFormatArg};

/// Environment variable holding an `EnvFilter` directive that overrides the
/// configured level.
pub const LOG_ENV: &str = "JABI_LOG";

/// The level after applying `--quiet` and `--verbose` to the configured one.
pub fn effective_level(global: &GlobalArgs, configured: LogLevel) -> LogLevel {
    if global.quiet {
        LogLevel::Error
    } else if global.verbose {
        configured.max(LogLevel::Debug)
    } else {
        configured
    }
}

/// The log encoding: `--log-format` wins over the config file.
pub fn effective_format(global: &GlobalArgs, configured: LogFormat) -> LogFormat {
    match global.log_format {
        Some(LogFormatArg::Text) => LogFormat::Text,
        Some(LogFormatArg::Json) => LogFormat::Json,
        None => configured,
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(global: &GlobalArgs, section: &LogSection) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    let level = effective_level(global, section.level);
    let format = effective_format(global, section.format);
    INITIALISED.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));
        let builder = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(global.color)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);
        match format {
            LogFormat::Json => {
                let _ = tracing::subscriber::set_global_default(builder.json().finish());
            }
            LogFormat::Text => {
                let _ = tracing::subscriber::set_global_default(builder.compact().finish());
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(quiet: bool, verbose: bool, log_format: Option<LogFormatArg>) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
            log_format,
        }
    }

    #[test]
    fn quiet_wins() {
        assert_eq!(
            effective_level(&global(true, true, None), LogLevel::Trace),
            LogLevel::Error
        );
    }

    #[test]
    fn verbose_raises_to_debug_only() {
        let verbose = global(false, true, None);
        assert_eq!(effective_level(&verbose, LogLevel::Info), LogLevel::Debug);
        assert_eq!(effective_level(&verbose, LogLevel::Trace), LogLevel::Trace);
        assert_eq!(
            effective_level(&global(false, false, None), LogLevel::Warn),
            LogLevel::Warn
        );
    }

    #[test]
    fn flag_overrides_configured_format() {
        assert_eq!(
            effective_format(&global(false, false, Some(LogFormatArg::Json)), LogFormat::Text),
            LogFormat::Json
        );
        assert_eq!(
            effective_format(&global(false, false, None), LogFormat::Json),
            LogFormat::Json
        );
    }
}
