//! # Logging Utilities
//!
//! Logging setup for threadstate binaries using `tracing`.
//!
//! Library crates only emit events; binaries call one of the init functions
//! here once at startup.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=threadstate_core=trace`)
//! - `THREADSTATE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `THREADSTATE_LOG_FILE`: Optional log file path, rolled daily. If it names an
//!   existing directory, a dated `threadstate-YYYY-MM-DD.log` is created inside.
//!
//! ## Example
//!
//! ```rust,no_run
//! use threadstate_utils::{init_logging_with, LogConfig, LogLevel};
//!
//! let config = LogConfig::from_env().with_level(LogLevel::Debug);
//! init_logging_with(&config).expect("Failed to initialize logging");
//! tracing::debug!("ready");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "THREADSTATE_LOG_FORMAT";

/// Environment variable naming an optional log file
pub const LOG_FILE_ENV: &str = "THREADSTATE_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Resolved logging configuration
///
/// Filter precedence: an explicit [`level`](Self::level) wins, then `RUST_LOG`,
/// then `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig
{
    /// Explicit level, overriding `RUST_LOG`
    pub level: Option<LogLevel>,
    /// Output format
    pub format: LogFormat,
    /// Optional log file, written in addition to stderr
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read format and file from the environment
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self
    {
        Self {
            level: None,
            format: env::var(LOG_FORMAT_ENV)
                .ok()
                .and_then(|s| LogFormat::from_str(&s).ok())
                .unwrap_or_default(),
            file: env::var_os(LOG_FILE_ENV).map(PathBuf::from),
        }
    }

    /// Override the level
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    /// Override the format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    /// Build the event filter for this configuration
    fn env_filter(&self) -> EnvFilter
    {
        match self.level {
            Some(level) => EnvFilter::new(Level::from(level).to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        }
    }
}

/// Initialize logging from the environment
///
/// Equivalent to `init_logging_with(&LogConfig::from_env())`.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<Option<WorkerGuard>, LoggingError>
{
    init_logging_with(&LogConfig::from_env())
}

/// Initialize logging with an explicit configuration
///
/// Console output goes to stderr so it never mixes with command output. When
/// a file is configured, the returned guard must be kept alive until exit to
/// flush buffered lines.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError>
{
    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(path));
            let layer = match config.format {
                LogFormat::Pretty => fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false) // No ANSI in files
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_filter(config.env_filter())
                    .boxed(),
                LogFormat::Json => fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(config.env_filter())
                    .boxed(),
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_filter(config.env_filter())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(config.env_filter())
            .boxed(),
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(guard)
}

/// Appender for the configured log path
fn rolling_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender
{
    if path.is_dir() {
        let file_name = format!("threadstate-{}.log", Utc::now().format("%Y-%m-%d"));
        return tracing_appender::rolling::never(path, file_name);
    }
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name().unwrap_or_default();
    tracing_appender::rolling::daily(directory, file_name)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}
