//! # Logging Utilities
//!
//! Logging setup for ironds binaries, built on `tracing`.
//!
//! The library crates only emit events through the `tracing` macros. A binary
//! calls [`init_logging`] (or [`init_logging_with`]) once at startup to install
//! a subscriber and keeps the returned [`LoggingGuard`] alive until exit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ironds_utils::init_logging;
//!
//! let _guard = init_logging().expect("Failed to initialize logging");
//! tracing::info!("debug server starting");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `debug`, `ironds_core=trace`)
//! - `IRONDS_LOG_FORMAT`: `pretty` (default) or `json`
//! - `IRONDS_LOG_FILE`: also write to this file, rotated daily. If it names an
//!   existing directory, a dated file (`YYYY-MM-DD-ironds.log`) is created in it.
//!
//! Console output goes to stderr so it never mixes with command output.
//!
//! ## Overriding the environment
//!
//! ```rust,no_run
//! use ironds_utils::{LogConfig, LogFormat, LogLevel, init_logging_with};
//!
//! let config = LogConfig::from_env()?.with_level(LogLevel::Debug).with_format(LogFormat::Json);
//! let _guard = init_logging_with(config)?;
//! # Ok::<(), ironds_utils::LoggingError>(())
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const FILTER_VAR: &str = "RUST_LOG";
const FORMAT_VAR: &str = "IRONDS_LOG_FORMAT";
const FILE_VAR: &str = "IRONDS_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Human-readable, colored on the console
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat
{
    pub const fn as_str(self) -> &'static str
    {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel
{
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel
{
    pub const fn as_str(self) -> &'static str
    {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.write_str(self.as_str())
    }
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
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Subscriber configuration
///
/// Filter precedence: an explicit [`level`](Self::level) wins over
/// [`filter`](Self::filter) directives, which win over the `info` default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig
{
    /// Single level for everything, typically from `--log-level`.
    pub level: Option<LogLevel>,
    /// `EnvFilter` directives, typically from `RUST_LOG`.
    pub filter: Option<String>,
    pub format: LogFormat,
    /// Extra file output.
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read `RUST_LOG`, `IRONDS_LOG_FORMAT` and `IRONDS_LOG_FILE`.
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` when `IRONDS_LOG_FORMAT` is set to something unknown.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError>
    {
        let non_empty = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        let format = match non_empty(FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            level: None,
            filter: non_empty(FILTER_VAR),
            format,
            file: non_empty(FILE_VAR).map(PathBuf::from),
        })
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self
    {
        self.file = Some(file.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError>
    {
        match (self.level, self.filter.as_deref()) {
            (Some(level), _) => Ok(EnvFilter::new(level.as_str())),
            (None, Some(directives)) => {
                EnvFilter::try_new(directives).map_err(|err| LoggingError::InvalidLevel(format!("{directives}: {err}")))
            }
            (None, None) => Ok(EnvFilter::new(LogLevel::Info.as_str())),
        }
    }
}

/// Keeps the background log writer alive
///
/// Dropping it flushes and stops file output; hold it for the life of the
/// program.
#[derive(Debug)]
pub struct LoggingGuard
{
    _worker: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard
{
    /// The file receiving log output, if any.
    pub fn log_file(&self) -> Option<&Path>
    {
        self.log_file.as_deref()
    }
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `IRONDS_LOG_FORMAT` or `RUST_LOG` can't be parsed
/// - The log file can't be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(LogConfig::from_env()?)
}

/// Initialize logging with an explicit configuration
///
/// ## Errors
///
/// Same as [`init_logging`].
pub fn init_logging_with(config: LogConfig) -> Result<LoggingGuard, LoggingError>
{
    type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

    let console = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);
    let console: BoxedLayer = match config.format {
        LogFormat::Pretty => console.with_ansi(true).with_filter(config.env_filter()?).boxed(),
        LogFormat::Json => console
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(config.env_filter()?)
            .boxed(),
    };
    let mut layers = vec![console];

    let mut worker = None;
    let mut log_file = None;
    if let Some(path) = config.file.as_deref() {
        let (appender, resolved) = file_appender(path, Utc::now())?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(writer);
        let file: BoxedLayer = match config.format {
            LogFormat::Pretty => file.with_filter(config.env_filter()?).boxed(),
            LogFormat::Json => file.json().with_filter(config.env_filter()?).boxed(),
        };
        layers.push(file);
        worker = Some(guard);
        log_file = Some(resolved);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard {
        _worker: worker,
        log_file,
    })
}

/// Name of the dated log file created inside a log directory.
pub fn dated_log_file_name(now: DateTime<Utc>) -> String
{
    format!("{}-ironds.log", now.format("%Y-%m-%d"))
}

fn file_appender(path: &Path, now: DateTime<Utc>) -> Result<(RollingFileAppender, PathBuf), LoggingError>
{
    let (directory, prefix, rotation) = if path.is_dir() {
        (path.to_path_buf(), dated_log_file_name(now), Rotation::NEVER)
    } else {
        let name = path
            .file_name()
            .ok_or_else(|| LoggingError::InvalidFile(path.to_path_buf()))?
            .to_string_lossy()
            .into_owned();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory)?;
        (directory, name, Rotation::DAILY)
    };

    let resolved = directory.join(&prefix);
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .build(&directory)
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok((appender, resolved))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level or filter directive
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// The log file path has no file name
    #[error("Invalid log file path: {}", .0.display())]
    InvalidFile(PathBuf),

    /// Failed to install the subscriber
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use chrono::TimeZone;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<LogConfig, LoggingError>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        LogConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("Warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert!(LogLevel::Trace > LogLevel::Info);
    }

    #[test]
    fn test_config_defaults_without_env()
    {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_reads_vars()
    {
        let config = config_from(&[
            ("RUST_LOG", "ironds_core=trace"),
            ("IRONDS_LOG_FORMAT", "json"),
            ("IRONDS_LOG_FILE", "/var/log/ironds.log"),
        ])
        .unwrap();
        assert_eq!(config.filter.as_deref(), Some("ironds_core=trace"));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/var/log/ironds.log")));
    }

    #[test]
    fn test_config_rejects_bad_format()
    {
        assert!(config_from(&[("IRONDS_LOG_FORMAT", "yaml")]).is_err());
    }

    #[test]
    fn test_blank_vars_are_ignored()
    {
        let config = config_from(&[("RUST_LOG", "  "), ("IRONDS_LOG_FILE", "")]).unwrap();
        assert_eq!(config.filter, None);
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_explicit_level_overrides_filter()
    {
        let config = config_from(&[("RUST_LOG", "ironds_core=loudest")])
            .unwrap()
            .with_level(LogLevel::Warn);
        assert!(config.env_filter().is_ok());

        let config = config_from(&[("RUST_LOG", "ironds_core=loudest")]).unwrap();
        assert!(matches!(config.env_filter(), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_dated_log_file_name()
    {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(dated_log_file_name(now), "2025-03-07-ironds.log");
    }

    #[test]
    fn test_file_path_without_name_is_rejected()
    {
        assert!(matches!(
            file_appender(Path::new("ironds-no-such-dir/.."), Utc::now()),
            Err(LoggingError::InvalidFile(_))
        ));
    }
}
