//! Logging setup for the binary.
//!
//! `RUST_LOG` wins when set. Otherwise the crate logs at the requested level
//! and everything else at `warn`.

use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines on stderr.
    #[default]
    Human,
    /// One JSON object per line on stderr.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected human or json")),
        }
    }
}

/// Parses a level name, falling back to `INFO` for unknown names.
#[must_use]
pub fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{level}', defaulting to INFO. Valid levels: trace, debug, info, warn, error"
            );
            Level::INFO
        }
    }
}

/// Builds the filter used when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,nativeflow={}",
        level.as_str().to_ascii_lowercase()
    ))
}

/// Installs the global subscriber. Later calls do nothing.
pub fn init_tracing(level: Level, format: LogFormat) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

        let (human, json) = match format {
            LogFormat::Human => (
                Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
                None,
            ),
            LogFormat::Json => (
                None,
                Some(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr)),
            ),
        };

        // Another subscriber may already be installed, for example by a test harness.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(human)
            .with(json)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("nope"), Level::INFO);
    }

    #[test]
    fn test_log_format() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Human".parse::<LogFormat>(), Ok(LogFormat::Human));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_filter_mentions_crate() {
        let filter = default_filter(Level::DEBUG).to_string().to_ascii_lowercase();
        assert!(filter.contains("nativeflow=debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(Level::INFO, LogFormat::Human);
        init_tracing(Level::DEBUG, LogFormat::Json);
    }
}
