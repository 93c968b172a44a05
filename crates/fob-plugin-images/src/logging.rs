//! Logging setup for hosts embedding the images plugin
//!
//! This module is only available with the `logging` feature.
//!
//! The filter is scoped to the `fob_images` and `fob_plugin_images` targets,
//! so enabling `Debug` shows the search, transform and hmr traces without
//! turning on debug output for the rest of the build.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

const TARGETS: [&str; 2] = ["fob_images", "fob_plugin_images"];

/// Log level for fob-images output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// No logging output
    Silent,
    Error,
    /// Errors and warnings (naming conflicts, empty scans)
    #[default]
    Warn,
    Info,
    /// Everything, including per-reference transform traces
    Debug,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Filter directives applying this level to the plugin's targets.
    fn directives(&self) -> String {
        TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.as_filter()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter())
    }
}

/// Install a global subscriber logging the plugin at `level`
///
/// Only the first call in a process has an effect. If the host already
/// installed a subscriber, this is a no-op.
///
/// # Example
///
/// ```rust,no_run
/// use fob_plugin_images::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| install(EnvFilter::new(level.directives())));
}

/// Initialize logging from the RUST_LOG environment variable
///
/// Falls back to [`LogLevel::default`] for the plugin's targets when RUST_LOG
/// is not set or invalid.
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().directives()));
        install(filter);
    });
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .try_init();
}
