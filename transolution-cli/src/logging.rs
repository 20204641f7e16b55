//! Logging setup using `tracing-subscriber`.
//!
//! Log lines go to stderr so command output on stdout stays parseable.
//! `RUST_LOG` overrides the configured level.

use std::io::{self, IsTerminal};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: io::stderr().is_terminal(),
        }
    }
}

impl LogConfig {
    /// - 0 (no `-v`): `fallback`, or warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+ (`-vvv`): trace
    pub fn from_verbosity(verbosity: u8, fallback: Option<&str>) -> Result<Self, String> {
        let level = match verbosity {
            0 => match fallback {
                Some(name) => parse_level(name)?,
                None => Level::WARN,
            },
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Ok(Self {
            level,
            ..Default::default()
        })
    }
}

fn parse_level(name: &str) -> Result<Level, String> {
    Level::from_str(name.trim()).map_err(|_| format!("Unknown log level: {}", name))
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Other crates stay at warn
        EnvFilter::new(format!(
            "warn,transolution={level},transolution_cli={level}"
        ))
    })
}
