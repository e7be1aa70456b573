//! Logging and timing for buildplan
//!
//! This crate provides the observability used by the pipeline and CLI:
//! - Structured logging with tracing, written to stderr
//! - Verbosity mapping for `-v` / `-q` flags
//! - Stage timers that report durations as tracing events

use once_cell::sync::Lazy;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
    });

    let compact_layer = (!config.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .without_time()
            .compact()
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Map CLI verbosity flags to a log level directive
pub fn level_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
    /// Include the event target
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Configuration for the given CLI verbosity flags
    pub fn for_verbosity(verbose: u8, quiet: bool) -> Self {
        Self {
            log_level: level_for_verbosity(verbose, quiet).to_string(),
            show_target: verbose >= 2,
            ..Self::default()
        }
    }
}

/// Timer for measuring a pipeline stage
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Time elapsed since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(
            stage = self.name,
            duration_us = u64::try_from(self.elapsed().as_micros()).unwrap_or(u64::MAX),
            "Stage completed"
        );
    }
}

/// Span plus timer for a pipeline stage
#[macro_export]
macro_rules! timed_span {
    ($name:expr) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::info_span!($name).entered();
    };
    ($name:expr, $($field:tt)*) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::info_span!($name, $($field)*).entered();
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0, false), "warn");
        assert_eq!(level_for_verbosity(1, false), "info");
        assert_eq!(level_for_verbosity(2, false), "debug");
        assert_eq!(level_for_verbosity(7, false), "trace");
        assert_eq!(level_for_verbosity(3, true), "error");
    }

    #[test]
    fn test_config_for_verbosity() {
        let config = TelemetryConfig::for_verbosity(2, false);
        assert_eq!(config.log_level, "debug");
        assert!(config.show_target);
        assert!(!config.json);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start("parse");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed().as_millis() >= 5);
    }

    #[test]
    fn test_session_id() {
        let id = session_id();
        assert!(!id.is_empty());
        // Should be a valid UUID
        assert!(Uuid::parse_str(id).is_ok());
    }
}
