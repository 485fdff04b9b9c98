//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default filter when RUST_LOG is unset (e.g. "warn", "debug").
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for edit results)
/// - The RUST_LOG environment variable can override the log level
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Pick the default filter from config and CLI flags.
///
/// `--verbose` forces debug. Otherwise the configured level is used, except
/// that the interactive session quiets "info" down to "warn" so log lines do
/// not interleave with prompts.
pub fn default_level(configured: &str, verbose: bool, interactive: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    match configured {
        "info" if interactive => "warn".to_string(),
        "" => "info".to_string(),
        other => other.to_string(),
    }
}

/// Initialize logging with configuration from Config.
pub fn init_from_config(
    config: &retouch_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
    interactive: bool,
) {
    let level = default_level(&config.logging.level, verbose_override, interactive);
    let json_format = json_logs_override || config.logging.format == "json";
    init(&level, json_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        assert_eq!(default_level("warn", true, false), "debug");
    }

    #[test]
    fn interactive_quiets_info() {
        assert_eq!(default_level("info", false, true), "warn");
        assert_eq!(default_level("info", false, false), "info");
        assert_eq!(default_level("trace", false, true), "trace");
    }

    #[test]
    fn empty_level_defaults_to_info() {
        assert_eq!(default_level("", false, false), "info");
    }
}
