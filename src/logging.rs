//! Tracing subscriber setup for the `tshare` binary.
//!
//! All log output goes to stderr so that stdout carries only shares or the
//! recovered secret and can be piped.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// JSON lines.
    Json,
}

/// Combine the configured level with a `-v` count. Each `-v` raises the
/// floor (`info`, `debug`, `trace`); a configured level that is already more
/// verbose is kept.
///
/// A default that is a full filter directive (e.g. `tshare=debug`) keeps its
/// per-target parts and gains the raised level as its global default.
pub fn level_for_verbosity(default_level: &str, verbose: u8) -> String {
    let raised = match verbose {
        0 => return default_level.to_string(),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    match default_level.trim().parse::<LevelFilter>() {
        Ok(configured) => configured.max(raised).to_string(),
        Err(_) => format!("{default_level},{raised}"),
    }
}

/// Install the global tracing subscriber. Call once, early in `main()`.
///
/// `RUST_LOG` overrides `default_level` when set.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .without_time(),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!("logging initialized (format={:?})", format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity("warn", 0), "warn");
        assert_eq!(level_for_verbosity("warn", 1), "info");
        assert_eq!(level_for_verbosity("warn", 2), "debug");
        assert_eq!(level_for_verbosity("warn", 9), "trace");
    }

    #[test]
    fn test_verbosity_never_lowers_configured_level() {
        assert_eq!(level_for_verbosity("trace", 1), "trace");
        assert_eq!(level_for_verbosity("trace", 2), "trace");
        assert_eq!(level_for_verbosity("debug", 1), "debug");
        assert_eq!(level_for_verbosity("debug", 3), "trace");
        assert_eq!(level_for_verbosity("DEBUG", 1), "debug");
    }

    #[test]
    fn test_verbosity_with_target_directives() {
        assert_eq!(level_for_verbosity("tshare=debug", 0), "tshare=debug");
        assert_eq!(level_for_verbosity("tshare=debug", 1), "tshare=debug,info");
    }
}
