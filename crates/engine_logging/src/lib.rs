#![deny(missing_docs)]
//! Shared logging utilities for the homenet workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the log level model shared by every front-end, and a minimal test
//! initializer for the global logger.

use std::fmt;
use std::str::FromStr;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Verbosity levels understood by the log-level preference.
///
/// The textual form is the upper-case name (`DEBUG`, `INFO`, `WARN`, `ERROR`),
/// which is also what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Everything, including per-pass renderer diagnostics.
    Debug,
    /// Lifecycle events. The default.
    #[default]
    Info,
    /// Ignored input and other recoverable oddities.
    Warn,
    /// Failed requests only.
    Error,
}

impl LogLevel {
    /// Upper-case name used on the command line and in the preference store.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Maps the level onto the `log` crate's filter.
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the four level names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogLevel(pub String);

impl fmt::Display for UnknownLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level {:?}", self.0)
    }
}

impl std::error::Error for UnknownLogLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    /// Level names are matched exactly; `debug` is not `DEBUG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(UnknownLogLevel(other.to_string())),
        }
    }
}

/// Outcome of resolving a log-level preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLogLevel {
    /// The level to install, when the resolved name was valid.
    pub level: Option<LogLevel>,
    /// The raw name that won the resolution order.
    pub raw: String,
}

impl ResolvedLogLevel {
    /// The value to write back into the preference store, if any.
    ///
    /// Only valid names are persisted, so a typo on the command line never
    /// overwrites a good stored value.
    pub fn persist_value(&self) -> Option<&'static str> {
        self.level.map(LogLevel::as_str)
    }
}

/// Resolves a log-level preference.
///
/// The explicit override (command line) wins over the stored per-key value,
/// which wins over `default`. Empty strings count as absent. An invalid winner
/// yields `level: None`, leaving the caller's current level in place.
pub fn resolve_log_level(
    explicit: Option<&str>,
    stored: Option<&str>,
    default: LogLevel,
) -> ResolvedLogLevel {
    let raw = explicit
        .filter(|value| !value.is_empty())
        .or_else(|| stored.filter(|value| !value.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| default.as_str().to_string());
    let level = raw.parse::<LogLevel>().ok();
    ResolvedLogLevel { level, raw }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
